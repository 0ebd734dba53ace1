//! # Retry middleware.
//!
//! Re-runs a validator whose result is an `Error` with a retryable cause
//! (see [`ValidatorError::is_retryable`]), up to [`RetryPolicy::attempts`]
//! runs in total. `Success` and `Failure` are verdicts and are returned as is.
//!
//! ```text
//! attempt 1 ── Error(Execution) ──► RetryScheduled, sleep(backoff.next(0))
//! attempt 2 ── Error(Execution) ──► RetryScheduled, sleep(backoff.next(1))
//! attempt 3 ── Error(Execution) ──► returned (budget exhausted)
//! ```
//!
//! The sleep races the run token: cancellation ends the loop with
//! `Error(Canceled)`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundle::ValidationInput;
use crate::error::ValidatorError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::RetryPolicy;
use crate::validator::{Descriptor, Status, ValidationResult, Validator, ValidatorRef};

use super::Middleware;

/// Bounded retry of erroring validators.
#[derive(Clone, Copy, Debug, Default)]
pub struct Retry {
    policy: RetryPolicy,
}

impl Retry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Middleware for Retry {
    fn wrap(&self, inner: ValidatorRef, bus: &Bus) -> ValidatorRef {
        Arc::new(Retrying {
            inner,
            policy: self.policy,
            bus: bus.clone(),
        })
    }
}

struct Retrying {
    inner: ValidatorRef,
    policy: RetryPolicy,
    bus: Bus,
}

#[async_trait]
impl Validator for Retrying {
    fn descriptor(&self) -> &Descriptor {
        self.inner.descriptor()
    }

    async fn validate(&self, ctx: CancellationToken, input: &ValidationInput) -> ValidationResult {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let result = self.inner.validate(ctx.clone(), input).await;

            let cause = match result.status() {
                Status::Error(e) if e.is_retryable() && attempt < attempts => e.to_string(),
                _ => return result,
            };

            let delay = self.policy.backoff.next(attempt - 1);
            self.bus.publish(
                Event::new(EventKind::RetryScheduled)
                    .with_validator(self.descriptor().code().to_string())
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(cause),
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = ctx.cancelled() => return self.descriptor().error(ValidatorError::Canceled),
            }
            attempt += 1;
        }
    }

    async fn clean_up(&self) -> Result<(), ValidatorError> {
        self.inner.clean_up().await
    }
}
