//! # Example: ordered_startup
//!
//! Starts three inter-dependent modules and serves until Ctrl-C.
//!
//! Shows how to:
//! - Declare dependencies with [`ModuleFn::with_requires`]
//! - Report readiness through the module's status cell
//! - Log lifecycle events with [`LogWriter`] and `tracing-subscriber`
//! - Drive the shutdown barrier with [`Manager::serve_until_signal`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► register api(requires db, cache), cache(requires db), db
//!   └─► serve_until_signal()
//!         ├─► start db    ── Running ──► ready
//!         ├─► start cache ── Running ──► ready
//!         ├─► start api   ── Running ──► ready
//!         ├─► ... Ctrl-C ...
//!         ├─► done(root.cancel)
//!         │     └─► every module drains and reports Stopped
//!         └─► return Ok
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=modvisor=debug cargo run --example ordered_startup
//! ```

use std::{sync::Arc, time::Duration};

use modvisor::{LogWriter, Manager, ManagerConfig, ModuleFn, ModuleStatus, Status};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Builds a module that warms up, ticks until cancelled, then drains.
fn service(
    name: &'static str,
    warmup: Duration,
    drain: Duration,
) -> ModuleFn<impl Fn(CancellationToken, Arc<ModuleStatus>) -> futures::future::BoxFuture<'static, ()>>
{
    ModuleFn::new(name, move |ctx: CancellationToken, status: Arc<ModuleStatus>| {
        Box::pin(async move {
            tokio::time::sleep(warmup).await;
            status.set(Status::Running);

            let mut tick = tokio::time::interval(Duration::from_secs(2));
            loop {
                tokio::select! {
                    _ = ctx.cancelled() => break,
                    _ = tick.tick() => tracing::info!(module = name, "tick"),
                }
            }

            tokio::time::sleep(drain).await;
            status.set(Status::Stopped);
        }) as futures::future::BoxFuture<'static, ()>
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modvisor=info")),
        )
        .init();

    // 1. Configure runtime
    let cfg = ManagerConfig {
        ready_timeout: Duration::from_secs(1),
        ..ManagerConfig::default()
    };
    let mgr = Manager::builder(cfg)
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();

    // 2. Register modules (order of registration does not matter)
    let api = service("api", Duration::from_millis(100), Duration::from_millis(300))
        .with_requires(["db", "cache"]);
    let cache = service("cache", Duration::from_millis(50), Duration::from_millis(100))
        .with_requires(["db"]);
    let db = service("db", Duration::from_millis(200), Duration::from_millis(500));

    mgr.add_module("api", Arc::new(api)).await;
    mgr.add_module("cache", Arc::new(cache)).await;
    mgr.add_module("db", Arc::new(db)).await;

    // 3. Serve until a termination signal, then wait for every module to stop
    if let Err(err) = mgr.serve_until_signal().await {
        tracing::error!(error = %err, label = err.as_label(), "manager failed");
        std::process::exit(1);
    }

    tracing::info!("all modules stopped");
    Ok(())
}
