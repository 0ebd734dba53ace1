//! # Event subscribers.
//!
//! ```text
//!   Bus ──► runner listener ──► SubscriberSet::emit(&Event)
//!                                  ├──► [queue] ─► LogWriter  (tracing)
//!                                  └──► [queue] ─► custom Subscribe impls
//! ```
//!
//! - [`Subscribe`] the trait to implement
//! - [`SubscriberSet`] fan-out with per-subscriber queues and panic isolation
//! - [`LogWriter`] built-in `tracing` renderer (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
