//! # bundlevisor
//!
//! **bundlevisor** is a pluggable, concurrent validation engine for operator
//! bundle metadata.
//!
//! Validators are opaque checks identified by a code (`AM0003`). The engine
//! selects them with a filter, decorates them (retry), runs them concurrently
//! against one immutable input and streams back exactly one tri-state result
//! per validator: `Success`, `Failure(messages)` or `Error(cause)`.
//!
//! ## Architecture
//! ```text
//!   index image ──► Extractor ──► [Bundle] ──┐
//!                   (IndexReader,            │   AddonMeta
//!                    BundleFetcher)          ▼       │
//!                                   Arc<ValidationInput>◄┘
//!                                            │
//!   Registry ──build──► Runner ◄── Filter ───┤
//!   (constructors)        │                  │
//!                         ├─► unit(AM0003) ──┤  Isolated ─► Retry ─► validate()
//!                         ├─► unit(AM0007) ──┤
//!                         └─► unit(…)      ──┘
//!                                │  one result each
//!                                ▼
//!                          ResultStream ──► ResultList ──► rows() / outcome()
//!
//!   every unit ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter, custom …
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Validators**    | Pluggable checks and their tri-state results.                 | [`Validator`], [`ValidationResult`]        |
//! | **Registry**      | Constructors assembled by the caller, built once.             | [`Registry`], [`Dependencies`]             |
//! | **Selection**     | Code and stage predicates with AND / OR / NOT.                | [`Filter`], [`filter::select`]             |
//! | **Execution**     | Concurrent fan-out with cancellation and a concurrency limit. | [`Runner`], [`ResultStream`]               |
//! | **Middleware**    | Bounded retry of erroring validators with backoff.            | [`Middleware`], [`Retry`], [`RetryPolicy`] |
//! | **Extraction**    | All-or-nothing concurrent bundle fetching.                    | [`Extractor`]                              |
//! | **RBAC rules**    | Operator-based predicates over CSV policy statements.         | [`rbac::RuleFilter`]                       |
//! | **Reporting**     | Report rows and process outcome.                              | [`ReportRow`], [`RunOutcome`]              |
//! | **Subscriber API**| Hook into validator lifecycle events.                         | [`Subscribe`], [`Event`]                   |
//! | **Configuration** | Concurrency, bus capacity, retry budget.                      | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use bundlevisor::{filter, validators, AddonMeta, Runner, RunOutcome, ValidationInput};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = Runner::builder(validators::registry())
//!         .with_retry()
//!         .build()?;
//!
//!     let input = Arc::new(ValidationInput::new(
//!         AddonMeta { operator_name: "reference-addon".into(), ..AddonMeta::default() },
//!         Vec::new(),
//!     ));
//!     let selection = filter::select("", "AM0003", "")?;
//!
//!     let results = runner
//!         .run(&CancellationToken::new(), input, selection.as_ref())
//!         .collect_sorted()
//!         .await;
//!     runner.clean_up().await?;
//!
//!     assert_eq!(results.len(), 1);
//!     assert_eq!(results.outcome(), RunOutcome::Passed);
//!     print!("{}", results.table());
//!     Ok(())
//! }
//! ```

mod bundle;
mod config;
mod core;
mod error;
mod events;
mod extractor;
pub mod filter;
mod middleware;
mod panic;
mod policies;
pub mod rbac;
mod registry;
mod report;
mod subscribers;
mod validator;
pub mod validators;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use bundle::{
    latest_bundle, AddonMeta, Bundle, BundleAnnotations, ClusterServiceVersion, CsvSpec,
    InstallStrategy, ValidationInput,
};
pub use config::Config;
pub use crate::core::{ResultStream, Runner, RunnerBuilder};
pub use error::{
    BuildError, BundleError, CleanupError, ExtractError, ParseError, RuleFilterError,
    ValidatorError,
};
pub use events::{Bus, Event, EventKind};
pub use extractor::{
    classify_index_image, BundleFetcher, Extractor, ImageRef, IndexImage, IndexReader,
};
pub use filter::Filter;
pub use middleware::{Middleware, Retry};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use registry::{Constructor, Dependencies, Registry};
pub use report::{ReportRow, RunOutcome, Table, HEADERS};
pub use subscribers::{Subscribe, SubscriberSet};
pub use validator::{
    Code, Descriptor, FailureMessages, ResultList, Stage, Status, ValidationResult, Validator,
    ValidatorRef, CODE_PREFIX,
};

// Built-in subscriber rendering events through `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
