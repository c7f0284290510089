//! # Lifecycle events.
//!
//! An [`Event`] is one observable step of the manager's work: a registry
//! change, a step of the startup walk, or a step of the shutdown barrier.
//! Which optional fields are filled depends on its [`EventKind`]; each
//! variant lists them.
//!
//! `seq` comes from a process-wide counter, so sorting by it recovers
//! publish order across subscribers.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use modvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StartupTimeout)
//!     .with_module("db")
//!     .with_timeout(Duration::from_secs(1));
//!
//! assert_eq!(ev.kind, EventKind::StartupTimeout);
//! assert_eq!(ev.module.as_deref(), Some("db"));
//! assert_eq!(ev.timeout_ms, Some(1000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::modules::Status;

/// Process-wide publish counter.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// A subscriber's `on_event` panicked.
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// An event was not queued for a subscriber.
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: `full` or `closed` cause
    SubscriberOverflow,

    // === Registry events ===
    /// Module registered under a name (new or replacing).
    ///
    /// Sets:
    /// - `module`: registry name
    ModuleAdded,

    /// Module removed from the registry.
    ///
    /// Sets:
    /// - `module`: registry name
    ModuleRemoved,

    // === Startup events ===
    /// Start order computed from declared dependencies.
    ///
    /// Sets:
    /// - `order`: module names in start order
    StartOrderResolved,

    /// A module's dependency count never reached zero (cycle or unknown dependency).
    ///
    /// Sets:
    /// - `module`: module name
    DependencyUnresolved,

    /// Module task is being spawned.
    ///
    /// Sets:
    /// - `module`: module name
    ModuleStarting,

    /// Module reported its first status transition after start.
    ///
    /// Sets:
    /// - `module`: module name
    /// - `status`: reported status
    ModuleReady,

    /// Module did not report a transition within the readiness window.
    ///
    /// Sets:
    /// - `module`: module name
    /// - `timeout_ms`: readiness window (ms)
    StartupTimeout,

    /// Module exposes no status cell.
    ///
    /// Sets:
    /// - `module`: module name
    StatusMissing,

    /// Module `run` panicked.
    ///
    /// Sets:
    /// - `module`: module name
    /// - `reason`: panic info/message
    ModulePanicked,

    /// Every module in the resolved order has been started.
    StartupComplete,

    // === Shutdown events ===
    /// Termination signal received by [`Manager::serve_until_signal`](crate::Manager::serve_until_signal).
    ///
    /// Sets:
    /// - `reason`: signal name
    SignalReceived,

    /// Stop requested; the manager is waiting on running modules.
    ///
    /// Sets:
    /// - `count`: number of modules being waited on
    ShutdownRequested,

    /// A module that was running reported `stopped`.
    ///
    /// Sets:
    /// - `module`: module name
    ModuleStopped,

    /// Every awaited module has stopped; shutdown barrier released.
    AllStopped,

    /// The root token was cancelled and `start_and_serve` is returning.
    ManagerExited,
}

/// One published lifecycle step.
#[derive(Clone, Debug)]
pub struct Event {
    /// Publish counter value.
    pub seq: u64,
    /// Creation time.
    pub at: SystemTime,
    pub kind: EventKind,

    /// Name of the module, if applicable.
    pub module: Option<Arc<str>>,
    /// Free-form detail: panic message, signal name, overflow cause.
    pub reason: Option<Arc<str>>,
    /// Observed module status.
    pub status: Option<Status>,
    /// Readiness timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Number of modules involved (shutdown barrier size).
    pub count: Option<usize>,
    /// Resolved start order.
    pub order: Option<Arc<[String]>>,
}

impl Event {
    /// Stamps a new event of `kind` with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            module: None,
            reason: None,
            status: None,
            timeout_ms: None,
            count: None,
            order: None,
        }
    }

    /// Sets `reason`.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a module name.
    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches an observed status.
    #[inline]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets `timeout_ms`, saturating at `u32::MAX`.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a module count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches the resolved start order.
    #[inline]
    pub fn with_order(mut self, order: &[String]) -> Self {
        self.order = Some(Arc::from(order));
        self
    }

    /// Event for a subscriber that could not take an event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_module(subscriber)
            .with_reason(reason)
    }

    /// Event for a subscriber whose `on_event` panicked.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_module(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
