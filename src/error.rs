//! Error types used by the validation engine, the extractor and the rule DSL.
//!
//! - [`ParseError`]: malformed user input (codes, stages, selection lists).
//! - [`ValidatorError`]: the cause carried by an `Error` validation result.
//! - [`BuildError`]: validator construction failures (fatal to a run).
//! - [`CleanupError`]: aggregated `clean_up` failures after a run.
//! - [`ExtractError`]: bundle extraction failures (fatal to a batch).
//! - [`RuleFilterError`]: rejected rule-filter declarations.
//! - [`BundleError`]: malformed bundle content.
//!
//! Most types provide `as_label` for logs and events.

use std::fmt;

use thiserror::Error;

use crate::validator::Code;

/// # Malformed input rejected before any concurrent work starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The string is not a well-formed validator code (`AM0001`).
    #[error("invalid validator code {input:?}: {reason}")]
    Code {
        /// Offending input.
        input: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The string does not name a known stage.
    #[error("unknown stage {input:?}; expected one of: pre-release, post-release")]
    Stage {
        /// Offending input.
        input: String,
    },

    /// A list option (e.g. `disabled`) contains an invalid element.
    #[error("unable to process {option:?} list {list:?}: {source}")]
    List {
        /// Name of the option being processed.
        option: &'static str,
        /// The raw list as supplied.
        list: String,
        /// The first element that failed to parse.
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseError::Code { .. } => "parse_code",
            ParseError::Stage { .. } => "parse_stage",
            ParseError::List { .. } => "parse_list",
        }
    }
}

/// # Cause of an `Error` validation result.
///
/// An error means the validator could not reach a verdict (infrastructure or
/// transient trouble), as opposed to a failure which is a verdict.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// Execution failed; re-running may succeed.
    #[error("execution failed: {error}")]
    Execution {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable error (never retried).
    #[error("fatal error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The validator panicked; the panic was contained by the runner.
    #[error("validator panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The run was cancelled before the validator produced a verdict.
    #[error("context cancelled")]
    Canceled,
}

impl ValidatorError {
    /// Shorthand for [`ValidatorError::Execution`].
    pub fn execution(error: impl fmt::Display) -> Self {
        ValidatorError::Execution {
            error: error.to_string(),
        }
    }

    /// Shorthand for [`ValidatorError::Fatal`].
    pub fn fatal(error: impl fmt::Display) -> Self {
        ValidatorError::Fatal {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use bundlevisor::ValidatorError;
    ///
    /// let err = ValidatorError::execution("registry unreachable");
    /// assert_eq!(err.as_label(), "validator_execution");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidatorError::Execution { .. } => "validator_execution",
            ValidatorError::Fatal { .. } => "validator_fatal",
            ValidatorError::Panicked { .. } => "validator_panicked",
            ValidatorError::Canceled => "validator_canceled",
        }
    }

    /// Indicates whether the retry middleware may re-run the validator.
    ///
    /// Only [`ValidatorError::Execution`] is retryable: fatal errors and panics
    /// are deterministic, and a cancelled run must stop.
    ///
    /// # Example
    /// ```
    /// use bundlevisor::ValidatorError;
    ///
    /// assert!(ValidatorError::execution("timeout").is_retryable());
    /// assert!(!ValidatorError::fatal("bad input").is_retryable());
    /// assert!(!ValidatorError::Canceled.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValidatorError::Execution { .. })
    }
}

/// # Validator construction failed; the run cannot start.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BuildError {
    /// One or more constructors returned an error.
    #[error("{} validator constructor(s) failed: {}", .errors.len(), join(.errors))]
    Construction {
        /// Every constructor error, in registration order.
        errors: Vec<ValidatorError>,
    },

    /// Two instantiated validators share the same code.
    #[error("duplicate validator code {code}")]
    DuplicateCode {
        /// The code registered more than once.
        code: Code,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::Construction { .. } => "build_construction",
            BuildError::DuplicateCode { .. } => "build_duplicate_code",
        }
    }
}

/// # One or more validators failed to release their resources.
#[derive(Error, Debug)]
#[error("cleaning up {} validator(s) failed: {}", .failures.len(), join_coded(.failures))]
pub struct CleanupError {
    /// Failing validators with their error, ordered by code.
    pub failures: Vec<(Code, ValidatorError)>,
}

/// # Extraction of a bundle set failed.
///
/// Any of these aborts the whole batch: a partial bundle set is never returned.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The index image reference is empty.
    #[error("invalid empty index image")]
    EmptyIndexImage,

    /// The package name scope is empty.
    #[error("invalid empty package name")]
    EmptyPackageName,

    /// The reference is not a well-formed image reference.
    #[error("can't parse image {image:?}: {reason}")]
    InvalidImage {
        /// Offending reference.
        image: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The index could not be resolved into bundle images.
    #[error("resolving bundle images from {image:?}: {error}")]
    Index {
        /// Index image reference.
        image: String,
        /// The underlying error message.
        error: String,
    },

    /// One bundle could not be fetched.
    #[error("fetching bundle {image:?}: {error}")]
    Fetch {
        /// Bundle image reference.
        image: String,
        /// The underlying error message.
        error: String,
    },

    /// A fetch task panicked or was aborted.
    #[error("fetch task for {image:?} died: {info}")]
    TaskDied {
        /// Bundle image reference.
        image: String,
        /// Join error rendered as text.
        info: String,
    },

    /// The shared extraction context was cancelled.
    #[error("extraction cancelled")]
    Canceled,
}

impl ExtractError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExtractError::EmptyIndexImage => "extract_empty_index_image",
            ExtractError::EmptyPackageName => "extract_empty_package_name",
            ExtractError::InvalidImage { .. } => "extract_invalid_image",
            ExtractError::Index { .. } => "extract_index",
            ExtractError::Fetch { .. } => "extract_fetch",
            ExtractError::TaskDied { .. } => "extract_task_died",
            ExtractError::Canceled => "extract_canceled",
        }
    }
}

/// # A rule-filter declaration was rejected at construction time.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuleFilterError {
    /// Unknown operator name.
    #[error("unsupported operator {0:?}")]
    Operator(String),

    /// Unknown rule attribute.
    #[error("unsupported rule attribute {0:?}")]
    Attribute(String),

    /// Unknown permission type.
    #[error("unsupported permission type {0:?}")]
    PermissionType(String),

    /// The declarative document could not be decoded.
    #[error("invalid rule filter document: {0}")]
    Document(#[from] serde_json::Error),
}

/// # Bundle content could not be interpreted.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// The CSV version is not valid semver.
    #[error("bundle {bundle:?} has invalid version {version:?}: {reason}")]
    InvalidVersion {
        /// Bundle name.
        bundle: String,
        /// Raw version string.
        version: String,
        /// Parser message.
        reason: String,
    },
}

fn join(errors: &[ValidatorError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_coded(failures: &[(Code, ValidatorError)]) -> String {
    failures
        .iter()
        .map(|(code, err)| format!("{code}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
