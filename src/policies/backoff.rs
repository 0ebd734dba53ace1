//! # Backoff between retry attempts.
//!
//! [`BackoffPolicy`] computes how long the retry middleware waits before the
//! next attempt of a validator that returned a retryable error:
//!
//! ```text
//! delay(n) = jitter( min(first × factor^n, max) )      n = retries so far
//! ```
//!
//! The base delay depends only on `n`, so a jittered delay never feeds back
//! into the next computation.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use bundlevisor::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(200),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(200));
//! assert_eq!(backoff.next(2), Duration::from_millis(800));
//! assert_eq!(backoff.next(3), Duration::from_secs(1));
//! ```

use std::time::Duration;

use super::JitterPolicy;

/// Exponential backoff with an upper bound and optional jitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Upper bound applied before jitter.
    pub max: Duration,
    /// Growth factor per retry (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to the bounded delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 100ms`, `factor = 2.0`, `max = 5s`, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay, useful in tests and for fixed-interval retries.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Delay before retry number `retry` (0-indexed).
    ///
    /// Overflow, NaN and negative intermediate values all clamp to `max`.
    pub fn next(&self, retry: u32) -> Duration {
        let exp = retry.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        };
        self.jitter.apply(base)
    }
}
