//! # Retry budget.

use std::time::Duration;

use super::BackoffPolicy;

/// How many times a validator may run, and how long to wait in between.
///
/// `max_attempts` counts the first run: `1` disables retries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// Three attempts with [`BackoffPolicy::default`].
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            backoff: BackoffPolicy::constant(Duration::ZERO),
        }
    }

    /// Attempt budget clamped to at least one run.
    #[inline]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
