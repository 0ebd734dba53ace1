//! # Example: retry_with_backoff
//!
//! Demonstrates how the [`Retry`] middleware re-runs a validator whose result
//! is a retryable error, waiting according to [`BackoffPolicy`] in between.
//!
//! The validator errors twice (a flaky registry lookup) and succeeds on the
//! third attempt. A failure verdict is never retried.
//!
//! ## Flow
//! ```text
//! Runner::run()
//!   └─► unit(AM0100)
//!         ├─► publish(ValidatorStarting, attempt=1)
//!         ├─► validate() → Error(Execution "registry timeout #1")
//!         ├─► publish(RetryScheduled{delay=100ms})
//!         ├─► sleep(delay)
//!         ├─► attempt=2 → Error(Execution "registry timeout #2")
//!         ├─► publish(RetryScheduled{delay≈200ms})
//!         ├─► attempt=3 → Success
//!         └─► publish(ValidatorSucceeded)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_with_backoff
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bundlevisor::{
    AddonMeta, BackoffPolicy, Code, Config, Descriptor, JitterPolicy, Registry, RetryPolicy,
    Runner, ValidationInput, ValidationResult, Validator, ValidatorError, ValidatorRef,
};
use tokio_util::sync::CancellationToken;

/// Errors on the first two calls, then succeeds.
struct FlakyLookup {
    desc: Descriptor,
    calls: AtomicU32,
}

#[async_trait]
impl Validator for FlakyLookup {
    fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    async fn validate(&self, _ctx: CancellationToken, _input: &ValidationInput) -> ValidationResult {
        let attempt = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[flaky] attempt {attempt}");

        if attempt <= 2 {
            return self
                .desc
                .error(ValidatorError::execution(format!("registry timeout #{attempt}")));
        }
        self.desc.success()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Retry budget: 4 attempts, 100ms doubling, equal jitter.
    let cfg = Config {
        retry: RetryPolicy {
            max_attempts: 4,
            backoff: BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_secs(2),
                factor: 2.0,
                jitter: JitterPolicy::Equal,
            },
        },
        ..Config::default()
    };

    // 2. Register the flaky validator.
    let registry = Registry::new().register(|_deps| {
        let v: ValidatorRef = Arc::new(FlakyLookup {
            desc: Descriptor::new(
                Code::new(100).map_err(ValidatorError::fatal)?,
                "flaky_lookup",
                "Looks something up in a registry that times out now and then.",
            ),
            calls: AtomicU32::new(0),
        });
        Ok(v)
    });

    // 3. `with_retry` reads the retry budget from the config set before it.
    let runner = Runner::builder(registry)
        .with_config(cfg)
        .with_retry()
        .build()?;

    let input = Arc::new(ValidationInput::new(AddonMeta::default(), Vec::new()));
    let results = runner
        .run(&CancellationToken::new(), input, None)
        .collect_sorted()
        .await;
    runner.clean_up().await?;

    print!("{}", results.table());
    println!("[main] outcome: {}", results.outcome().as_label());
    Ok(())
}
