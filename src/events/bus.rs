//! # Event bus.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]: publishing never blocks, the ring
//! buffer is shared by all receivers, lagging receivers skip the oldest events
//! and events published with no receiver are dropped.
//!
//! ```text
//!   run unit 1 ──┐
//!   run unit N ──┼──► Bus ──► listener (in Runner) ──► SubscriberSet
//!   Retry      ──┤
//!   clean_up   ──┘
//! ```

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus; capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers (fire-and-forget).
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
