//! # modvisor
//!
//! **modvisor** starts a set of named, inter-dependent, long-running async
//! modules in dependency order and later shuts them down together.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Module "db" │   │Module "cache"│   │ Module "api" │
//!     │ requires: [] │   │requires:[db] │   │requires:[db, │
//!     └──────┬───────┘   └──────┬───────┘   │       cache] │
//!            │                  │           └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Manager                                                          │
//! │  - Registry (name → module, name → derived CancellationToken)     │
//! │  - graph::resolve_order (Kahn, cycle detection)                   │
//! │  - Bus (broadcast events) → SubscriberSet (LogWriter, custom…)    │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     run(token)         run(token)         run(token)      one task each
//!     status.set(Running) ...                               readiness signal
//! ```
//!
//! ### Lifecycle
//! ```text
//! start_and_serve(root):
//!   order = resolve_order()                      ── cycle ──► Err(UnresolvedDependencies)
//!   for m in order:
//!     spawn m.run(root.child_token())
//!     wait first status transition ≤ ready_timeout ── timeout ──► Err(StartupTimeout)
//!   wait root.cancelled()                        ── panic  ──► Err(ModulePanicked)
//!
//! done(stop):
//!   observers for every Running module
//!   stop()                                       (cancels root)
//!   all observers saw Stopped ──► completion signal
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                        |
//! |-------------------|-----------------------------------------------------------------|-------------------------------------------|
//! | **Modules**       | Long-running units with a status cell and dependencies.         | [`Module`], [`ModuleFn`], [`ModuleRef`]   |
//! | **Status**        | Observable lifecycle state with best-effort change signal.      | [`ModuleStatus`], [`Status`]              |
//! | **Orchestration** | Dependency-ordered startup, readiness timeout, shutdown barrier.| [`Manager`], [`ManagerBuilder`]           |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, alerts).          | [`Subscribe`], [`LogWriter`]              |
//! | **Errors**        | Typed, fatal startup errors.                                    | [`RuntimeError`]                          |
//! | **Configuration** | Readiness window and bus sizing.                                | [`ManagerConfig`]                         |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use modvisor::{LogWriter, Manager, ManagerConfig, ModuleFn, ModuleStatus, Status};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mgr = Manager::builder(ManagerConfig::default())
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     let serve = |ctx: CancellationToken, status: Arc<ModuleStatus>| async move {
//!         status.set(Status::Running);
//!         ctx.cancelled().await;
//!         status.set(Status::Stopped);
//!     };
//!     mgr.add_module("db", ModuleFn::arc("db", serve)).await;
//!     mgr.add_module("api", Arc::new(ModuleFn::new("api", serve).with_requires(["db"]))).await;
//!
//!     let root = CancellationToken::new();
//!     let server = tokio::spawn({
//!         let mgr = Arc::clone(&mgr);
//!         let root = root.clone();
//!         async move { mgr.start_and_serve(root).await }
//!     });
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     let done = mgr.done(|| root.cancel()).await;
//!     done.await?;
//!     server.await??;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod modules;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Manager, ManagerBuilder, ManagerConfig, wait_for_shutdown_signal};
pub use error::RuntimeError;
pub use events::{Bus, Event, EventKind};
pub use modules::{Module, ModuleFn, ModuleRef, ModuleStatus, Status, StatusWatch};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
