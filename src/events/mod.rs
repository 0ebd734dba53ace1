//! Runtime events: data model and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Publishers
//! - the runner (skip, start and verdict events, cleanup failures)
//! - [`Retry`](crate::Retry) middleware (`RetryScheduled`)
//! - `SubscriberSet` workers (overflow, panic)
//!
//! The runner's listener task is the single consumer; it fans events out to
//! the configured subscribers.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
