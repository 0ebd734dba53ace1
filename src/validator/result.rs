//! # Tri-state validation results.
//!
//! A [`ValidationResult`] is exactly one of:
//! - **success**: the input satisfies the rule;
//! - **failure**: the input violates the rule, with at least one reason;
//! - **error**: the validator could not reach a verdict.
//!
//! [`ResultList`] collects the results of a run and answers the aggregate
//! questions used to decide the process outcome.

use std::ops::Deref;

use crate::error::ValidatorError;

use super::{Code, Descriptor};

/// Non-empty, ordered list of failure reasons.
///
/// The only way to build one is [`FailureMessages::new`], which refuses an
/// empty list: a failure without a reason cannot be represented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureMessages(Vec<String>);

impl FailureMessages {
    /// Returns `None` when `messages` is empty.
    pub fn new(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self(messages))
        }
    }
}

impl Deref for FailureMessages {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Outcome of one validator run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The rule holds.
    Success,
    /// The rule is violated.
    Failure(FailureMessages),
    /// No verdict could be reached.
    Error(ValidatorError),
}

/// Result of one validator, tagged with the validator's identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    code: Code,
    name: String,
    description: String,
    status: Status,
}

impl ValidationResult {
    /// Creates a result for the validator described by `desc`.
    pub fn new(desc: &Descriptor, status: Status) -> Self {
        Self {
            code: desc.code(),
            name: desc.name().to_string(),
            description: desc.description().to_string(),
            status,
        }
    }

    /// Code of the originating validator.
    #[inline]
    pub fn code(&self) -> Code {
        self.code
    }

    /// Name of the originating validator.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description of the originating validator.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The tri-state outcome.
    #[inline]
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.status, Status::Failure(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Status::Error(_))
    }

    /// Failure reasons, if this is a failure.
    pub fn failure_messages(&self) -> Option<&[String]> {
        match &self.status {
            Status::Failure(messages) => Some(messages),
            _ => None,
        }
    }

    /// Error cause, if this is an error.
    pub fn error(&self) -> Option<&ValidatorError> {
        match &self.status {
            Status::Error(cause) => Some(cause),
            _ => None,
        }
    }

    /// Short status label for reports and events.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            Status::Success => "Success",
            Status::Failure(_) => "Failed",
            Status::Error(_) => "Error",
        }
    }
}

/// Ordered collection of validation results.
///
/// Emission order from the runner is completion order; call [`ResultList::sort`]
/// to get the stable, code-ascending order used for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultList(Vec<ValidationResult>);

impl ResultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ValidationResult) {
        self.0.push(result);
    }

    /// Sorts by validator code, ascending.
    pub fn sort(&mut self) {
        self.0.sort_by_key(ValidationResult::code);
    }

    /// True if any result is a failure.
    pub fn has_failure(&self) -> bool {
        self.0.iter().any(ValidationResult::is_failure)
    }

    /// Every error cause, in list order.
    pub fn errors(&self) -> Vec<&ValidatorError> {
        self.0.iter().filter_map(ValidationResult::error).collect()
    }

    pub fn into_inner(self) -> Vec<ValidationResult> {
        self.0
    }
}

impl Deref for ResultList {
    type Target = [ValidationResult];

    fn deref(&self) -> &[ValidationResult] {
        &self.0
    }
}

impl FromIterator<ValidationResult> for ResultList {
    fn from_iter<I: IntoIterator<Item = ValidationResult>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ValidationResult> for ResultList {
    fn extend<I: IntoIterator<Item = ValidationResult>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ResultList {
    type Item = ValidationResult;
    type IntoIter = std::vec::IntoIter<ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultList {
    type Item = &'a ValidationResult;
    type IntoIter = std::slice::Iter<'a, ValidationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
