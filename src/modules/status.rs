//! # Module status cell.
//!
//! [`ModuleStatus`] holds the observable lifecycle state of one module together
//! with a broadcast-on-change signal.
//!
//! ## Rules
//! - `get`/`set` are mutually exclusive (single lock, never held across `.await`)
//! - `set` broadcasts the new value **without blocking**
//! - a watcher observes only transitions made **after** [`ModuleStatus::watch`] returned
//! - a transition with no watcher at that instant is dropped, not queued
//! - delivery is buffered per watcher, not a rendezvous: a watcher that exists
//!   but is not awaiting [`StatusWatch::changed`] at `set` time still gets the
//!   value later (up to 16 pending values, then it skips to newer ones)
//!
//! ```text
//! watch() ──► StatusWatch ─┐
//!                          │   set(Running)
//! set(Stopped) (missed)    ├─◄───────────────  changed() → Some(Running)
//!                          │   set(Stopped)
//!                          └─◄───────────────  changed() → Some(Stopped)
//! ```
//!
//! ## Example
//! ```rust
//! use modvisor::{ModuleStatus, Status};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cell = ModuleStatus::new();
//! assert_eq!(cell.get(), Status::Stopped);
//!
//! let mut watch = cell.watch();
//! cell.set(Status::Running);
//! assert_eq!(watch.changed().await, Some(Status::Running));
//! # }
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

/// Ring size per watcher; a watcher that falls further behind skips to newer values.
const WATCH_CAPACITY: usize = 16;

/// Lifecycle state of a module.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Module is serving.
    Running,
    /// Module is not serving (initial and terminal state).
    Stopped,
}

impl Status {
    /// Returns a short stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Stopped => "stopped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status of one module plus a best-effort change signal.
#[derive(Debug)]
pub struct ModuleStatus {
    current: Mutex<Status>,
    tx: broadcast::Sender<Status>,
}

impl ModuleStatus {
    /// Creates a cell in the [`Status::Stopped`] state.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(WATCH_CAPACITY);
        Self {
            current: Mutex::new(Status::Stopped),
            tx,
        }
    }

    /// Returns the current status.
    pub fn get(&self) -> Status {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Updates the status and notifies current watchers.
    ///
    /// The value is sent while the lock is held so watchers see transitions
    /// in the same order as `get` does. With no watchers the signal is dropped.
    pub fn set(&self, status: Status) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = status;
        let _ = self.tx.send(status);
    }

    /// Starts watching for subsequent transitions.
    pub fn watch(&self) -> StatusWatch {
        StatusWatch {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ModuleStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of a [`ModuleStatus`] signal.
#[derive(Debug)]
pub struct StatusWatch {
    rx: broadcast::Receiver<Status>,
}

impl StatusWatch {
    /// Waits for the next transition.
    ///
    /// Returns `None` once the owning cell has been dropped and every
    /// pending value was consumed.
    pub async fn changed(&mut self) -> Option<Status> {
        loop {
            match self.rx.recv().await {
                Ok(status) => return Some(status),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
