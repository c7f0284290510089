//! # Function-backed module (`ModuleFn`)
//!
//! [`ModuleFn`] wraps a closure `F: Fn(CancellationToken, Arc<ModuleStatus>) -> Fut`,
//! producing a fresh future per start. The closure receives the module's own
//! status cell and is responsible for setting it.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use modvisor::{ModuleFn, ModuleRef, ModuleStatus, Status};
//!
//! let api: ModuleRef = Arc::new(
//!     ModuleFn::new("api", |ctx: CancellationToken, status: Arc<ModuleStatus>| async move {
//!         status.set(Status::Running);
//!         ctx.cancelled().await;
//!         status.set(Status::Stopped);
//!     })
//!     .with_requires(["db"]),
//! );
//!
//! assert_eq!(api.name(), "api");
//! assert_eq!(api.requires(), ["db".to_string()]);
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::module::Module;
use super::status::ModuleStatus;

/// Function-backed module implementation.
pub struct ModuleFn<F> {
    name: Cow<'static, str>,
    status: Arc<ModuleStatus>,
    requires: Vec<String>,
    f: F,
}

impl<F> ModuleFn<F> {
    /// Creates a new function-backed module with no dependencies.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            status: Arc::new(ModuleStatus::new()),
            requires: Vec::new(),
            f,
        }
    }

    /// Creates the module and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }

    /// Declares the modules that must be ready before this one starts.
    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    /// Returns a handle to this module's status cell.
    pub fn status_cell(&self) -> Arc<ModuleStatus> {
        Arc::clone(&self.status)
    }
}

#[async_trait]
impl<F, Fut> Module for ModuleFn<F>
where
    F: Fn(CancellationToken, Arc<ModuleStatus>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Option<&ModuleStatus> {
        Some(&self.status)
    }

    async fn run(&self, ctx: CancellationToken) {
        (self.f)(ctx, Arc::clone(&self.status)).await
    }

    fn requires(&self) -> &[String] {
        &self.requires
    }
}
