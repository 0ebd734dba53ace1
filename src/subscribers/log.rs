//! # Logging subscriber.
//!
//! [`LogWriter`] renders every event as a structured [`tracing`] record under
//! the `bundlevisor` target. Install any `tracing` subscriber in the binary to
//! see them.
//!
//! ```text
//! DEBUG validator=AM0007 "validator skipped"
//! INFO  validator=AM0003 attempt=1 "validator starting"
//! WARN  validator=AM0003 attempt=1 delay_ms=100 reason="registry down" "retry scheduled"
//! WARN  validator=AM0003 reason="..." "validator errored"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Subscriber that forwards events to `tracing`.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let validator = e.validator.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ValidatorSkipped => {
                debug!(target: "bundlevisor", seq = e.seq, validator, "validator skipped");
            }
            EventKind::ValidatorStarting => {
                info!(target: "bundlevisor", seq = e.seq, validator, attempt = e.attempt, "validator starting");
            }
            EventKind::ValidatorSucceeded => {
                info!(target: "bundlevisor", seq = e.seq, validator, "validator succeeded");
            }
            EventKind::ValidatorFailed => {
                info!(target: "bundlevisor", seq = e.seq, validator, reason, "validator failed");
            }
            EventKind::ValidatorErrored => {
                warn!(target: "bundlevisor", seq = e.seq, validator, reason, "validator errored");
            }
            EventKind::RetryScheduled => {
                warn!(
                    target: "bundlevisor",
                    seq = e.seq,
                    validator,
                    attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    reason,
                    "retry scheduled"
                );
            }
            EventKind::CleanupFailed => {
                warn!(target: "bundlevisor", seq = e.seq, validator, reason, "validator clean up failed");
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                let subscriber = e.subscriber.unwrap_or("-");
                warn!(target: "bundlevisor", seq = e.seq, subscriber, reason, kind = e.kind.as_label(), "subscriber unhealthy");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
