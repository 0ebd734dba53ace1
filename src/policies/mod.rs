//! Retry policies.
//!
//! ## Contents
//! - [`RetryPolicy`]  how many attempts a validator gets
//! - [`BackoffPolicy`] how delays between attempts evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization of those delays
//!
//! ## Wiring
//! ```text
//! Config { retry: RetryPolicy } ──► middleware::Retry
//!     └─► on a retryable error result: sleep(backoff.next(retry)) and run again
//! ```

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
