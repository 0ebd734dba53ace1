//! # Validator abstraction.
//!
//! A [`Validator`] is an opaque, pluggable check. The engine only knows how to
//! read its [`Descriptor`], run it against a [`ValidationInput`] and ask it to
//! release resources afterwards. The common handle type is [`ValidatorRef`],
//! an `Arc<dyn Validator>` shared between the runner and its worker tasks.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::bundle::ValidationInput;
use crate::error::ValidatorError;

use super::{Descriptor, ValidationResult};

/// Shared handle to a validator.
pub type ValidatorRef = Arc<dyn Validator>;

/// # Asynchronous, cancelable check.
///
/// Implementations must always return a [`ValidationResult`]; anything that
/// prevents a verdict is reported as an error result, never swallowed.
/// Long-running validators should watch `ctx` and return
/// [`ValidatorError::Canceled`] promptly when it fires.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use bundlevisor::{Code, Descriptor, ValidationInput, ValidationResult, Validator};
///
/// struct HasBundles(Descriptor);
///
/// #[async_trait]
/// impl Validator for HasBundles {
///     fn descriptor(&self) -> &Descriptor { &self.0 }
///
///     async fn validate(&self, _ctx: CancellationToken, input: &ValidationInput) -> ValidationResult {
///         if input.bundles.is_empty() {
///             return self.0.fail(["no bundles found"]);
///         }
///         self.0.success()
///     }
/// }
///
/// let v = HasBundles(Descriptor::new(Code::new(1).unwrap(), "has_bundles", "At least one bundle."));
/// assert_eq!(v.descriptor().name(), "has_bundles");
/// ```
#[async_trait]
pub trait Validator: Send + Sync + 'static {
    /// Identity and metadata; must not change over the validator's lifetime.
    fn descriptor(&self) -> &Descriptor;

    /// Runs the check against `input`.
    async fn validate(&self, ctx: CancellationToken, input: &ValidationInput) -> ValidationResult;

    /// Releases per-validator resources (temporary files, clients).
    ///
    /// Called once by [`Runner::clean_up`](crate::Runner::clean_up).
    async fn clean_up(&self) -> Result<(), ValidatorError> {
        Ok(())
    }
}
