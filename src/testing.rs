//! Scripted validators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundle::{AddonMeta, ValidationInput};
use crate::error::ValidatorError;
use crate::validator::{Code, Descriptor, Stage, Status, ValidationResult, Validator, ValidatorRef};

/// Validator replaying a list of statuses; the last one repeats forever.
pub(crate) struct Scripted {
    desc: Descriptor,
    script: Mutex<VecDeque<Status>>,
    last: Status,
    delay: Duration,
    panics: bool,
    cleanup: Option<ValidatorError>,
    calls: AtomicU32,
}

impl Scripted {
    pub(crate) fn new(code: u32, script: Vec<Status>) -> Self {
        let last = script.last().cloned().unwrap_or(Status::Success);
        Self {
            desc: Descriptor::new(Code::new(code).unwrap(), format!("scripted_{code}"), "scripted"),
            script: Mutex::new(script.into()),
            last,
            delay: Duration::ZERO,
            panics: false,
            cleanup: None,
            calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn always(code: u32, status: Status) -> Self {
        Self::new(code, vec![status])
    }

    pub(crate) fn panicking(code: u32) -> Self {
        Self {
            panics: true,
            ..Self::new(code, vec![])
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_stages(mut self, stages: &[Stage]) -> Self {
        self.desc = self.desc.with_stages(stages.iter().copied());
        self
    }

    pub(crate) fn failing_cleanup(mut self, error: ValidatorError) -> Self {
        self.cleanup = Some(error);
        self
    }

    pub(crate) fn into_ref(self) -> ValidatorRef {
        Arc::new(self)
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Validator for Scripted {
    fn descriptor(&self) -> &Descriptor {
        &self.desc
    }

    async fn validate(&self, ctx: CancellationToken, _input: &ValidationInput) -> ValidationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("scripted panic");
        }
        if !self.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                _ = ctx.cancelled() => return self.desc.error(ValidatorError::Canceled),
            }
        }
        let status = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        ValidationResult::new(&self.desc, status)
    }

    async fn clean_up(&self) -> Result<(), ValidatorError> {
        match &self.cleanup {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

pub(crate) fn empty_input() -> Arc<ValidationInput> {
    Arc::new(ValidationInput::new(AddonMeta::default(), Vec::new()))
}

pub(crate) fn failure(msg: &str) -> Status {
    Status::Failure(crate::validator::FailureMessages::new(vec![msg.to_string()]).unwrap())
}
