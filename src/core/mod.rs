//! Runtime core: building a runner and executing validators concurrently.
//!
//! ```text
//! RunnerBuilder::build()
//!   ├─► Registry::build(&deps)                       validators, once
//!   ├─► Bus::new(cfg.bus_capacity)
//!   ├─► Semaphore(cfg.max_concurrent)                optional
//!   └─► listener: Bus ─► SubscriberSet::emit(&Event) only with subscribers
//!
//! Runner::run(&token, input, filter)
//!   validators ─► filter ──(rejected)──► ValidatorSkipped
//!        │
//!        └─► Isolated(v) ─► middleware[0] ─► … ─► middleware[n]
//!               │
//!               └─► tokio::spawn(unit) × N ── permit? ── validate ── send ──► mpsc(N)
//!                                                                          │
//!                                                     ResultStream ◄───────┘
//! ```
//!
//! - Every spawned unit sends exactly one result, whatever happens to the
//!   validator (verdict, error, panic, cancellation).
//! - The stream ends once every unit has sent.
//! - Results arrive in completion order; sort them with
//!   [`ResultStream::collect_sorted`].

mod builder;
mod isolate;
mod runner;
mod stream;

pub use builder::RunnerBuilder;
pub use runner::Runner;
pub use stream::ResultStream;
