//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for validator lifecycle and subscriber health.
//! - Wire the subscriber into [`Runner::builder`].
//!
//! ## Flow
//! ```text
//! Runner::run(stages = post-release)
//!     ├─► publish(ValidatorSkipped AM0007)      pre-release only
//!     ├─► unit(AM0003) ─► publish(ValidatorStarting / ValidatorFailed)
//!     └─► listener (in Runner)
//!           └─► SubscriberSet.emit() ──► ConsoleSubscriber.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::sync::Arc;

use bundlevisor::{
    filter, validators, AddonMeta, Bundle, BundleAnnotations, ClusterServiceVersion, CsvSpec,
    Event, EventKind, Runner, Subscribe, ValidationInput,
};
use tokio_util::sync::CancellationToken;

/// Prints selected events to stdout.
/// In real life, you could export metrics, ship logs, or trigger alerts.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        let validator = ev.validator.as_deref().unwrap_or("<unknown>");
        let reason = ev.reason.as_deref().unwrap_or("<none>");

        match ev.kind {
            EventKind::ValidatorSkipped => println!("[sub] skipped:   {validator}"),
            EventKind::ValidatorStarting => println!(
                "[sub] starting:  {validator} attempt={}",
                ev.attempt.unwrap_or(0)
            ),
            EventKind::ValidatorSucceeded => println!("[sub] succeeded: {validator}"),
            EventKind::ValidatorFailed => println!("[sub] failed:    {validator} reason={reason}"),
            EventKind::ValidatorErrored => println!("[sub] errored:   {validator} reason={reason}"),
            EventKind::RetryScheduled => println!(
                "[sub] retry:     {validator} delay={}ms",
                ev.delay_ms.unwrap_or(0)
            ),
            EventKind::CleanupFailed => println!("[sub] cleanup:   {validator} reason={reason}"),
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => println!(
                "[sub] health:    {} {} reason={reason}",
                ev.subscriber.unwrap_or("<unknown>"),
                ev.kind.as_label()
            ),
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn queue_capacity(&self) -> usize {
        64
    }
}

fn bundle(csv_name: &str, package: &str, version: &str) -> Bundle {
    Bundle {
        name: format!("{package}-bundle"),
        image: None,
        annotations: BundleAnnotations {
            package_name: package.into(),
            ..BundleAnnotations::default()
        },
        csv: ClusterServiceVersion {
            name: csv_name.into(),
            spec: CsvSpec {
                version: version.into(),
                ..CsvSpec::default()
            },
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let runner = Runner::builder(validators::registry())
        .with_subscribers(vec![Arc::new(ConsoleSubscriber) as Arc<dyn Subscribe>])
        .build()?;

    // The second bundle's CSV is named after a different operator.
    let input = Arc::new(ValidationInput::new(
        AddonMeta {
            operator_name: "reference-addon".into(),
            ..AddonMeta::default()
        },
        vec![
            bundle("reference-addon.v1.0.0", "reference-addon", "1.0.0"),
            bundle("other-addon.v1.1.0", "reference-addon", "1.1.0"),
        ],
    ));

    // Validators without stages run in every stage.
    let selection = filter::select("", "", "post-release")?;

    let results = runner
        .run(&CancellationToken::new(), input, selection.as_ref())
        .collect_sorted()
        .await;
    runner.clean_up().await?;
    runner.shutdown().await;

    print!("{}", results.table());
    std::process::exit(results.outcome().exit_code());
}
