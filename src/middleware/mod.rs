//! # Validator middleware.
//!
//! A [`Middleware`] decorates a validator with cross-cutting behavior without
//! touching its descriptor. The runner applies its middleware list in order to
//! every selected validator, so the first entry ends up innermost:
//!
//! ```text
//! with_middleware([A, B])  ⇒  B( A( isolate(validator) ) )
//! ```
//!
//! [`Retry`] is the built-in decorator.

mod retry;

pub use retry::Retry;

use crate::events::Bus;
use crate::validator::ValidatorRef;

/// Validator decorator.
pub trait Middleware: Send + Sync + 'static {
    /// Wraps `inner`; the returned validator must report `inner`'s descriptor.
    fn wrap(&self, inner: ValidatorRef, bus: &Bus) -> ValidatorRef;
}
