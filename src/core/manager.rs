//! # Manager: dependency-ordered startup and the shutdown barrier.
//!
//! The [`Manager`] owns the module registry, the event bus and the
//! [`SubscriberSet`]. It starts modules one by one in dependency order and
//! later waits for every running module to stop.
//!
//! ## Startup
//! ```text
//! start_and_serve(root)
//!   ├─► registry.write()                       (held for the whole walk)
//!   ├─► resolve_order()  ── Err ──► UnresolvedDependencies
//!   ├─► for name in order:
//!   │     ├─► cancel previous token for `name` (if any)
//!   │     ├─► token = root.child_token()        (stored in registry)
//!   │     ├─► status()     ── None ──► MissingStatus
//!   │     ├─► watch = status.watch()            (before spawn: first transition can't be missed)
//!   │     ├─► runner::spawn_guarded(module, token)
//!   │     └─► select!
//!   │           ├─ sleep(ready_timeout)  ──► StartupTimeout
//!   │           ├─ fatal_rx              ──► ModulePanicked
//!   │           └─ watch.changed()       ──► ModuleReady, next module
//!   ├─► drop(write guard), publish StartupComplete
//!   └─► select!
//!         ├─ root.cancelled() ──► Ok(())
//!         └─ fatal_rx         ──► ModulePanicked
//! ```
//!
//! ## Shutdown
//! ```text
//! done(stop)
//!   ├─► registry.read()
//!   ├─► for each module with status == Running:
//!   │     └─► observer: watch.changed() until Stopped ──► ModuleStopped
//!   ├─► publish ShutdownRequested{count}
//!   ├─► stop()                                  (cancels root → child tokens)
//!   └─► join all observers ──► AllStopped ──► oneshot fires
//! ```
//!
//! ## Rules
//! - Start order respects dependencies; stop order is unspecified
//! - A module has at most one live derived token
//! - Every startup failure is fatal; there is no retry and no rollback
//! - The shutdown barrier has **no timeout**: a hung module blocks it forever

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::{builder::ManagerBuilder, config::ManagerConfig, graph, runner, shutdown};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::modules::{ModuleRef, Status};
use crate::subscribers::SubscriberSet;

/// Registered modules and their derived cancellation tokens.
#[derive(Default)]
struct Registry {
    modules: HashMap<String, ModuleRef>,
    tokens: HashMap<String, CancellationToken>,
}

/// Starts modules in dependency order and coordinates their shutdown.
pub struct Manager {
    cfg: ManagerConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    registry: RwLock<Registry>,
}

impl Manager {
    /// Returns a builder for configuring the manager.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: ManagerConfig, bus: Bus, subs: Arc<SubscriberSet>) -> Self {
        Self {
            cfg,
            bus,
            subs,
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Returns the manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    pub(crate) fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Registers `module` under `name`, replacing any previous module with that name.
    ///
    /// Waits while a startup walk is in progress.
    pub async fn add_module(&self, name: impl Into<String>, module: ModuleRef) {
        let name = name.into();
        let mut registry = self.registry.write().await;
        registry.modules.insert(name.clone(), module);
        drop(registry);

        self.bus
            .publish(Event::new(EventKind::ModuleAdded).with_module(name));
    }

    /// Removes the module registered under `name`.
    ///
    /// A running module is not cancelled. Its derived token stays on record,
    /// so a later start under the same name cancels the old run first.
    pub async fn del_module(&self, name: &str) -> Option<ModuleRef> {
        let mut registry = self.registry.write().await;
        let removed = registry.modules.remove(name);
        drop(registry);

        if removed.is_some() {
            self.bus
                .publish(Event::new(EventKind::ModuleRemoved).with_module(name));
        }
        removed
    }

    /// Returns the sorted list of registered module names.
    pub async fn modules(&self) -> Vec<String> {
        let registry = self.registry.read().await;
        let mut names: Vec<String> = registry.modules.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Returns the current status of the module registered under `name`.
    pub async fn status_of(&self, name: &str) -> Option<Status> {
        let registry = self.registry.read().await;
        registry
            .modules
            .get(name)
            .and_then(|m| m.status().map(|s| s.get()))
    }

    /// Starts every registered module in dependency order, then serves until `root` is cancelled.
    ///
    /// ### Errors
    /// - [`RuntimeError::UnresolvedDependencies`]: cycle or unknown dependency
    /// - [`RuntimeError::MissingStatus`]: a module has no status cell
    /// - [`RuntimeError::StartupTimeout`]: a module did not report within `ready_timeout`
    /// - [`RuntimeError::StatusClosed`]: a status cell vanished before readiness
    /// - [`RuntimeError::ModulePanicked`]: a module's `run` panicked (during startup or later)
    ///
    /// All errors are fatal; modules already started are left running.
    pub async fn start_and_serve(&self, root: CancellationToken) -> Result<(), RuntimeError> {
        let (fatal_tx, mut fatal_rx) = mpsc::unbounded_channel();

        {
            let mut registry = self.registry.write().await;
            let order = self.resolve_order(&registry)?;
            self.bus
                .publish(Event::new(EventKind::StartOrderResolved).with_order(&order));

            for name in &order {
                self.start_module(&mut registry, name, &root, &fatal_tx, &mut fatal_rx)
                    .await?;
            }
        }
        self.bus.publish(Event::new(EventKind::StartupComplete));

        tokio::select! {
            _ = root.cancelled() => {
                self.bus.publish(Event::new(EventKind::ManagerExited));
                Ok(())
            }
            Some(err) = fatal_rx.recv() => Err(err),
        }
    }

    /// Requests shutdown and returns a signal that fires once every running module has stopped.
    ///
    /// Modules not `Running` at call time are not waited on. `stop` is invoked
    /// after the observers are in place and is expected to cancel the root
    /// token passed to [`start_and_serve`](Self::start_and_serve).
    pub async fn done<F>(&self, stop: F) -> oneshot::Receiver<()>
    where
        F: FnOnce(),
    {
        let (tx, rx) = oneshot::channel();
        let mut observers = JoinSet::new();

        {
            let registry = self.registry.read().await;
            for (name, module) in &registry.modules {
                let Some(status) = module.status() else {
                    self.bus
                        .publish(Event::new(EventKind::StatusMissing).with_module(name.as_str()));
                    continue;
                };

                let mut watch = status.watch();
                if status.get() != Status::Running {
                    continue;
                }

                let bus = self.bus.clone();
                let name: Arc<str> = Arc::from(name.as_str());
                observers.spawn(async move {
                    while let Some(status) = watch.changed().await {
                        if status == Status::Stopped {
                            break;
                        }
                    }
                    bus.publish(Event::new(EventKind::ModuleStopped).with_module(name));
                });
            }
        }

        self.bus
            .publish(Event::new(EventKind::ShutdownRequested).with_count(observers.len()));

        let bus = self.bus.clone();
        tokio::spawn(async move {
            while observers.join_next().await.is_some() {}
            bus.publish(Event::new(EventKind::AllStopped));
            let _ = tx.send(());
        });

        stop();
        rx
    }

    /// Serves until SIGINT/SIGTERM/SIGQUIT (Ctrl-C on non-unix), then drives the shutdown barrier.
    ///
    /// Startup errors and module panics are returned as soon as they happen.
    pub async fn serve_until_signal(&self) -> Result<(), RuntimeError> {
        let root = CancellationToken::new();
        let serve = self.start_and_serve(root.clone());
        tokio::pin!(serve);

        tokio::select! {
            res = &mut serve => return res,
            sig = shutdown::wait_for_shutdown_signal() => match sig {
                Ok(name) => self
                    .bus
                    .publish(Event::new(EventKind::SignalReceived).with_reason(name)),
                Err(err) => {
                    tracing::warn!(error = %err, "signal handlers unavailable, serving until a module fails");
                    return serve.await;
                }
            },
        }

        let barrier = async {
            let rx = self.done(|| root.cancel()).await;
            let _ = rx.await;
        };
        tokio::pin!(barrier);

        tokio::select! {
            res = &mut serve => {
                res?;
                barrier.await;
                Ok(())
            }
            _ = &mut barrier => serve.await,
        }
    }

    /// Resolves the start order, reporting every unresolved module on the bus.
    fn resolve_order(&self, registry: &Registry) -> Result<Vec<String>, RuntimeError> {
        let res = graph::resolve_order(
            registry
                .modules
                .iter()
                .map(|(name, module)| (name.as_str(), module.requires())),
        );
        if let Err(RuntimeError::UnresolvedDependencies { modules }) = &res {
            for name in modules {
                self.bus.publish(
                    Event::new(EventKind::DependencyUnresolved).with_module(name.as_str()),
                );
            }
        }
        res
    }

    /// Starts one module and waits for its first status transition.
    async fn start_module(
        &self,
        registry: &mut Registry,
        name: &str,
        root: &CancellationToken,
        fatal_tx: &mpsc::UnboundedSender<RuntimeError>,
        fatal_rx: &mut mpsc::UnboundedReceiver<RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let Some(module) = registry.modules.get(name).cloned() else {
            return Ok(());
        };

        if let Some(previous) = registry.tokens.remove(name) {
            previous.cancel();
        }
        let token = root.child_token();
        registry.tokens.insert(name.to_string(), token.clone());

        let Some(status) = module.status() else {
            self.bus
                .publish(Event::new(EventKind::StatusMissing).with_module(name));
            return Err(RuntimeError::MissingStatus {
                module: name.to_string(),
            });
        };
        let mut watch = status.watch();

        let module_name: Arc<str> = Arc::from(name);
        self.bus
            .publish(Event::new(EventKind::ModuleStarting).with_module(Arc::clone(&module_name)));
        runner::spawn_guarded(
            Arc::clone(&module_name),
            Arc::clone(&module),
            token,
            self.bus.clone(),
            fatal_tx.clone(),
        );

        let timeout = self.cfg.ready_timeout_clamped();
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                self.bus.publish(
                    Event::new(EventKind::StartupTimeout)
                        .with_module(module_name)
                        .with_timeout(timeout),
                );
                Err(RuntimeError::StartupTimeout {
                    module: name.to_string(),
                    timeout,
                })
            }
            Some(err) = fatal_rx.recv() => Err(err),
            changed = watch.changed() => match changed {
                Some(status) => {
                    self.bus.publish(
                        Event::new(EventKind::ModuleReady)
                            .with_module(module_name)
                            .with_status(status),
                    );
                    Ok(())
                }
                None => Err(RuntimeError::StatusClosed {
                    module: name.to_string(),
                }),
            },
        }
    }
}
