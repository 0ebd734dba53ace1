//! # Runtime events emitted by the runner, the retry middleware and subscriber workers.
//!
//! [`EventKind`] classifies events in three groups:
//! - **Selection / lifecycle**: a validator was skipped, started, or reached a verdict
//! - **Retry / cleanup**: a retry was scheduled, a `clean_up` call failed
//! - **Subscriber health**: a subscriber dropped an event or panicked
//!
//! Every [`Event`] carries a globally increasing `seq`; use it to restore the
//! publication order when events from concurrent validators interleave.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use bundlevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_validator("AM0003")
//!     .with_attempt(1)
//!     .with_delay(Duration::from_millis(200))
//!     .with_reason("registry unreachable");
//!
//! assert_eq!(ev.validator.as_deref(), Some("AM0003"));
//! assert_eq!(ev.delay_ms, Some(200));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Validator rejected by the run filter.
    ///
    /// Sets `validator`.
    ValidatorSkipped,

    /// Validator attempt is starting.
    ///
    /// Sets `validator`, `attempt` (1-based).
    ValidatorStarting,

    /// Validator returned `Success`.
    ///
    /// Sets `validator`.
    ValidatorSucceeded,

    /// Validator returned `Failure`.
    ///
    /// Sets `validator`, `reason` (messages joined with `"; "`).
    ValidatorFailed,

    /// Validator returned `Error` (after retries, if any).
    ///
    /// Sets `validator`, `reason` (error text).
    ValidatorErrored,

    /// An erroring attempt will be re-run.
    ///
    /// Sets `validator`, `attempt` (the attempt that failed), `delay_ms`, `reason`.
    RetryScheduled,

    /// `Validator::clean_up` returned an error.
    ///
    /// Sets `validator`, `reason`.
    CleanupFailed,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `subscriber`, `reason`.
    SubscriberOverflow,

    /// Subscriber panicked while handling an event.
    ///
    /// Sets `subscriber`, `reason` (panic info).
    SubscriberPanicked,
}

impl EventKind {
    /// Short stable label (snake_case).
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::ValidatorSkipped => "validator_skipped",
            EventKind::ValidatorStarting => "validator_starting",
            EventKind::ValidatorSucceeded => "validator_succeeded",
            EventKind::ValidatorFailed => "validator_failed",
            EventKind::ValidatorErrored => "validator_errored",
            EventKind::RetryScheduled => "retry_scheduled",
            EventKind::CleanupFailed => "cleanup_failed",
            EventKind::SubscriberOverflow => "subscriber_overflow",
            EventKind::SubscriberPanicked => "subscriber_panicked",
        }
    }
}

/// Runtime event with optional metadata.
///
/// Which optional fields are set depends on the [`EventKind`].
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Validator code.
    pub validator: Option<Arc<str>>,
    /// Subscriber name, for subscriber health events only.
    pub subscriber: Option<&'static str>,
    /// Attempt number, starting at 1.
    pub attempt: Option<u32>,
    /// Retry delay in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable detail.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            validator: None,
            subscriber: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_validator(mut self, validator: impl Into<Arc<str>>) -> Self {
        self.validator = Some(validator.into());
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Self {
            subscriber: Some(subscriber),
            ..Event::new(EventKind::SubscriberOverflow).with_reason(reason)
        }
    }

    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Self {
            subscriber: Some(subscriber),
            ..Event::new(EventKind::SubscriberPanicked).with_reason(info)
        }
    }

    /// True for events produced by the subscriber machinery itself.
    #[inline]
    pub fn is_subscriber_health(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}
