//! # LogWriter: events as `tracing` records
//!
//! Renders every [`Event`] as a leveled `tracing` record with flat key-value
//! fields. Install any `tracing` subscriber (e.g. `tracing-subscriber`'s fmt
//! layer) to see the output.
//!
//! ## Levels
//! - `debug`: registry changes, module starting, subscriber overflow
//! - `info`: order resolved, module ready, startup complete, shutdown progress
//! - `warn`: unresolved dependency, module stopped during shutdown
//! - `error`: startup timeout, missing status, module or subscriber panic
//!
//! ## Example output
//! ```text
//! INFO  modvisor: start order resolved order=["db", "cache", "api"]
//! INFO  modvisor: module switched status module="db" status=running
//! ERROR modvisor: module startup time exceeds expectations module="api" timeout_ms=1000
//! WARN  modvisor: module has gracefully exited module="db"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let module = e.module.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ModuleAdded => {
                debug!(target: "modvisor", module, "module registered");
            }
            EventKind::ModuleRemoved => {
                debug!(target: "modvisor", module, "module removed");
            }
            EventKind::StartOrderResolved => {
                info!(target: "modvisor", order = ?e.order.as_deref().unwrap_or(&[]), "start order resolved");
            }
            EventKind::DependencyUnresolved => {
                warn!(target: "modvisor", module, "module dependency tree not cleared to zero");
            }
            EventKind::ModuleStarting => {
                debug!(target: "modvisor", module, "starting module by order");
            }
            EventKind::ModuleReady => {
                let status = e.status.map(|s| s.as_str()).unwrap_or("-");
                info!(target: "modvisor", module, status, "module switched status");
            }
            EventKind::StartupTimeout => {
                error!(target: "modvisor", module, timeout_ms = ?e.timeout_ms, "module startup time exceeds expectations");
            }
            EventKind::StatusMissing => {
                error!(target: "modvisor", module, "unable to obtain module status");
            }
            EventKind::ModulePanicked => {
                error!(target: "modvisor", module, reason, "module panicked during running");
            }
            EventKind::StartupComplete => {
                info!(target: "modvisor", "all modules started");
            }
            EventKind::SignalReceived => {
                info!(target: "modvisor", signal = reason, "shutdown signal received");
            }
            EventKind::ShutdownRequested => {
                info!(target: "modvisor", count = ?e.count, "waiting for running modules to exit");
            }
            EventKind::ModuleStopped => {
                warn!(target: "modvisor", module, "module has gracefully exited");
            }
            EventKind::AllStopped => {
                info!(target: "modvisor", "all modules stopped");
            }
            EventKind::ManagerExited => {
                info!(target: "modvisor", "module manager exit by cancellation");
            }
            EventKind::SubscriberOverflow => {
                debug!(target: "modvisor", subscriber = module, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(target: "modvisor", subscriber = module, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
