//! # Subscriber trait.
//!
//! `Subscribe` is the extension point for event consumers. Each subscriber is
//! driven by its own worker task fed by a bounded queue owned by the
//! [`SubscriberSet`](super::SubscriberSet), so a slow subscriber never blocks
//! validators or other subscribers.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use bundlevisor::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ValidatorFailed {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "failure-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name used in logs and subscriber health events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue; overflowing events are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
