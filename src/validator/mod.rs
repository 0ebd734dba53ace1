//! # Validator contract and result model.
//!
//! This module provides the types every validator and every consumer of the
//! engine shares:
//! - [`Code`] and [`Stage`] - identity and lifecycle classification;
//! - [`Descriptor`] - code, name, description and stages of a validator;
//! - [`Validator`] / [`ValidatorRef`] - the pluggable check;
//! - [`ValidationResult`], [`Status`], [`ResultList`] - the tri-state outcome.

mod code;
mod descriptor;
mod result;
mod stage;
#[allow(clippy::module_inception)]
mod validator;

pub use code::{Code, CODE_PREFIX};
pub use descriptor::Descriptor;
pub use result::{FailureMessages, ResultList, Status, ValidationResult};
pub use stage::Stage;
pub use validator::{Validator, ValidatorRef};
