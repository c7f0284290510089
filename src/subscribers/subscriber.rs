//! # The `Subscribe` capability.
//!
//! A manager has no global logger. Whatever should observe the lifecycle
//! (log sink, metrics, alerting) implements [`Subscribe`] and is handed to
//! [`ManagerBuilder::with_subscriber`](crate::ManagerBuilder::with_subscriber).
//!
//! The [`SubscriberSet`](crate::SubscriberSet) gives every subscriber its own
//! bounded queue and worker task; a panic inside `on_event` is caught and
//! republished as `EventKind::SubscriberPanicked`.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use modvisor::{Event, EventKind, Subscribe};
//!
//! struct Pager;
//!
//! #[async_trait]
//! impl Subscribe for Pager {
//!     async fn on_event(&self, ev: &Event) {
//!         eprintln!("page: {:?} on {:?}", ev.kind, ev.module);
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "pager"
//!     }
//!
//!     fn accepts(&self, kind: EventKind) -> bool {
//!         matches!(kind, EventKind::StartupTimeout | EventKind::ModulePanicked)
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Receiver of runtime events.
///
/// `on_event` runs on the subscriber's own worker, so a slow implementation
/// only fills its own queue. It should not block the executor and should not
/// panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Events arrive in publish order.
    async fn on_event(&self, event: &Event);

    /// Name reported in `SubscriberOverflow` and `SubscriberPanicked` events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber (clamped to at least 1).
    ///
    /// When the queue is full new events are dropped for this subscriber only.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Returns `false` for event kinds this subscriber never wants queued.
    fn accepts(&self, _kind: EventKind) -> bool {
        true
    }
}
