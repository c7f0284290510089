//! # Module abstraction.
//!
//! A [`Module`] is a named, long-running unit with a status cell, a blocking
//! [`run`](Module::run) entry point and a list of dependency names.
//!
//! The manager starts `run` on its own task and waits for the first status
//! transition before starting dependents. Implementations are expected to:
//! - call `status.set(Status::Running)` once ready to serve;
//! - watch the [`CancellationToken`] and return promptly once it fires;
//! - call `status.set(Status::Stopped)` as the last act before returning.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::status::ModuleStatus;

/// Shared handle to a module (`Arc<dyn Module>`).
pub type ModuleRef = Arc<dyn Module>;

/// # Long-running unit orchestrated by the [`Manager`](crate::Manager).
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use modvisor::{Module, ModuleStatus, Status};
///
/// struct Cache {
///     status: ModuleStatus,
///     requires: Vec<String>,
/// }
///
/// #[async_trait]
/// impl Module for Cache {
///     fn name(&self) -> &str { "cache" }
///
///     fn status(&self) -> Option<&ModuleStatus> { Some(&self.status) }
///
///     fn requires(&self) -> &[String] { &self.requires }
///
///     async fn run(&self, ctx: CancellationToken) {
///         self.status.set(Status::Running);
///         ctx.cancelled().await;
///         self.status.set(Status::Stopped);
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns a stable, human-readable module name.
    fn name(&self) -> &str;

    /// Returns the module's status cell.
    ///
    /// `None` makes startup fail with [`RuntimeError::MissingStatus`](crate::RuntimeError::MissingStatus).
    fn status(&self) -> Option<&ModuleStatus>;

    /// Runs the module until `ctx` is cancelled.
    async fn run(&self, ctx: CancellationToken);

    /// Registry names of the modules that must be ready before this one starts.
    fn requires(&self) -> &[String] {
        &[]
    }
}
