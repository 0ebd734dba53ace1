//! # Engine configuration.
//!
//! [`Config`] gathers the runner's tunables: concurrency limit, event bus
//! capacity and the retry budget applied by [`Retry`](crate::Retry).
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore is created)
//! - `bus_capacity = 0` → treated as `1`
//! - `retry.max_attempts = 0` → treated as `1` (no retry)
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use bundlevisor::{BackoffPolicy, Config, RetryPolicy};
//!
//! let mut cfg = Config::default();
//! cfg.max_concurrent = 4;
//! cfg.retry = RetryPolicy {
//!     max_attempts: 5,
//!     backoff: BackoffPolicy::constant(Duration::from_millis(250)),
//! };
//!
//! assert_eq!(cfg.concurrency_limit(), Some(4));
//! ```

use crate::policies::RetryPolicy;

/// Runner configuration.
///
/// All fields are public; prefer the accessors over checking sentinels inline.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of validators running at once (`0` = unlimited).
    pub max_concurrent: usize,

    /// Capacity of the event bus ring buffer.
    ///
    /// Subscribers lagging more than this many events skip the oldest ones.
    pub bus_capacity: usize,

    /// Retry budget used when the runner is built with [`Retry`](crate::Retry)
    /// middleware from this config.
    pub retry: RetryPolicy,
}

impl Default for Config {
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `retry = RetryPolicy::default()` (3 attempts, 100ms doubling to 5s)
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            bus_capacity: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Concurrency limit, `None` when unlimited.
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        (self.max_concurrent > 0).then_some(self.max_concurrent)
    }

    /// Bus capacity clamped to at least one slot.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_unlimited() {
        let cfg = Config::default();
        assert_eq!(cfg.concurrency_limit(), None);

        let cfg = Config {
            max_concurrent: 2,
            ..Config::default()
        };
        assert_eq!(cfg.concurrency_limit(), Some(2));
    }

    #[test]
    fn bus_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
