//! Innermost decorator: numbers attempts and turns panics into error results.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::bundle::ValidationInput;
use crate::error::ValidatorError;
use crate::events::{Bus, Event, EventKind};
use crate::validator::{Descriptor, ValidationResult, Validator, ValidatorRef};

/// Wraps one validator for the duration of one run.
pub(super) struct Isolated {
    inner: ValidatorRef,
    bus: Bus,
    attempts: AtomicU32,
}

impl Isolated {
    pub(super) fn new(inner: ValidatorRef, bus: Bus) -> Self {
        Self {
            inner,
            bus,
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl Validator for Isolated {
    fn descriptor(&self) -> &Descriptor {
        self.inner.descriptor()
    }

    async fn validate(&self, ctx: CancellationToken, input: &ValidationInput) -> ValidationResult {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        self.bus.publish(
            Event::new(EventKind::ValidatorStarting)
                .with_validator(self.descriptor().code().to_string())
                .with_attempt(attempt),
        );

        match AssertUnwindSafe(self.inner.validate(ctx, input))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(payload) => self.descriptor().error(ValidatorError::Panicked {
                info: crate::panic::message(&*payload),
            }),
        }
    }

    async fn clean_up(&self) -> Result<(), ValidatorError> {
        self.inner.clean_up().await
    }
}
