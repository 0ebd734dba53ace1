//! # Validator descriptor.
//!
//! Identity and human-facing metadata of a validator. The code is the identity;
//! name and description are display-only. Descriptors are immutable once built.

use std::borrow::Cow;

use crate::error::ValidatorError;

use super::{Code, FailureMessages, Stage, Status, ValidationResult};

/// Identity and metadata of a validator.
///
/// ## Example
/// ```rust
/// use bundlevisor::{Code, Descriptor, Stage};
///
/// let desc = Descriptor::new(Code::new(3).unwrap(), "operator_name", "Validate the operator name.")
///     .with_stages([Stage::PreRelease]);
///
/// assert_eq!(desc.code().to_string(), "AM0003");
/// assert!(desc.applies_to(Stage::PreRelease));
/// assert!(!desc.applies_to(Stage::PostRelease));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    code: Code,
    name: Cow<'static, str>,
    description: Cow<'static, str>,
    stages: Vec<Stage>,
}

impl Descriptor {
    /// Creates a descriptor that applies to every stage.
    pub fn new(
        code: Code,
        name: impl Into<Cow<'static, str>>,
        description: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            description: description.into(),
            stages: Stage::ALL.to_vec(),
        }
    }

    /// Restricts the stages this validator applies to.
    ///
    /// An empty list keeps the default (every stage).
    pub fn with_stages(mut self, stages: impl IntoIterator<Item = Stage>) -> Self {
        let mut stages: Vec<Stage> = stages.into_iter().collect();
        if !stages.is_empty() {
            stages.sort_unstable();
            stages.dedup();
            self.stages = stages;
        }
        self
    }

    /// Returns the validator code.
    #[inline]
    pub fn code(&self) -> Code {
        self.code
    }

    /// Returns the short snake_case name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the one-line description.
    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the declared stages (sorted, never empty).
    #[inline]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// True if the validator declares `stage`.
    pub fn applies_to(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Builds a success result for this validator.
    pub fn success(&self) -> ValidationResult {
        ValidationResult::new(self, Status::Success)
    }

    /// Builds a failure result for this validator.
    ///
    /// A failure needs at least one message; an empty iterator yields a success.
    pub fn fail<I, S>(&self, messages: I) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let status = match FailureMessages::new(messages.into_iter().map(Into::into).collect()) {
            Some(messages) => Status::Failure(messages),
            None => Status::Success,
        };
        ValidationResult::new(self, status)
    }

    /// Builds an error result for this validator.
    pub fn error(&self, cause: ValidatorError) -> ValidationResult {
        ValidationResult::new(self, Status::Error(cause))
    }
}
