//! # Event bus.
//!
//! Every lifecycle transition the manager drives is published on a [`Bus`].
//! A single listener inside the manager forwards the stream to the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! Manager ─────┐
//! module task ─┼──► Bus (broadcast ring) ──► listener ──► SubscriberSet
//! SubscriberSet┘
//! ```
//!
//! Publishing never waits. With no live receiver the event is discarded, and
//! a receiver that falls more than `capacity` events behind loses the oldest ones.

use tokio::sync::broadcast;

use super::event::Event;

/// Publisher handle for runtime events; clones share one channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining up to `capacity` undelivered events (at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every live receiver; dropped when there is none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
