//! # Guarded module execution.
//!
//! Spawns one module's [`run`](crate::Module::run) on its own task and turns an
//! uncaught panic into a fatal report instead of a silently dead module.
//!
//! ```text
//! spawn_guarded(name, module, token)
//!   └─► tokio::spawn
//!         └─► catch_unwind(module.run(token))
//!               ├─ returns  → task ends (module stopped itself)
//!               └─ panics   → publish ModulePanicked
//!                             → fatal_tx.send(RuntimeError::ModulePanicked)
//! ```
//!
//! ## Rules
//! - A panic is **never** swallowed: the manager receives it on the fatal channel
//! - The runner does not touch the module's status cell

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::modules::ModuleRef;

/// Spawns `module.run(ctx)` with panic escalation.
pub(crate) fn spawn_guarded(
    name: Arc<str>,
    module: ModuleRef,
    ctx: CancellationToken,
    bus: Bus,
    fatal_tx: mpsc::UnboundedSender<RuntimeError>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let fut = module.run(ctx);
        if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
            let info = panic_message(payload.as_ref());
            bus.publish(
                Event::new(EventKind::ModulePanicked)
                    .with_module(Arc::clone(&name))
                    .with_reason(info.as_str()),
            );
            let _ = fatal_tx.send(RuntimeError::ModulePanicked {
                module: name.to_string(),
                info,
            });
        }
    })
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
