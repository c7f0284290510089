//! Error types used by the modvisor runtime.
//!
//! [`RuntimeError`] covers every way bringing the module set up can fail.
//! All variants are fatal: the manager never retries a module start and never
//! rolls back modules that are already running. The caller is expected to
//! terminate the process.
//!
//! Helper methods (`as_label`, `as_message`) are provided for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the modvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Dependency counts never reached zero: a cycle or a dependency that is not registered.
    #[error("module may have cyclic or unresolved dependencies in {modules:?}")]
    UnresolvedDependencies {
        /// Modules whose dependency count stayed positive (sorted).
        modules: Vec<String>,
    },

    /// A module did not report a status transition within the readiness window.
    #[error("module[{module}] startup time exceeds {timeout:?}")]
    StartupTimeout {
        /// Module name.
        module: String,
        /// Readiness window that elapsed.
        timeout: Duration,
    },

    /// A registered module exposes no status cell.
    #[error("unable to obtain module[{module}] status")]
    MissingStatus {
        /// Module name.
        module: String,
    },

    /// The module's status channel closed before it reported readiness.
    #[error("module[{module}] status has not been properly initialized")]
    StatusClosed {
        /// Module name.
        module: String,
    },

    /// A module's `run` panicked.
    #[error("module[{module}] throws a panic during running: {info}")]
    ModulePanicked {
        /// Module name.
        module: String,
        /// Panic payload rendered as text.
        info: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use modvisor::RuntimeError;
    ///
    /// let err = RuntimeError::MissingStatus { module: "db".into() };
    /// assert_eq!(err.as_label(), "runtime_missing_status");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::UnresolvedDependencies { .. } => "runtime_unresolved_dependencies",
            RuntimeError::StartupTimeout { .. } => "runtime_startup_timeout",
            RuntimeError::MissingStatus { .. } => "runtime_missing_status",
            RuntimeError::StatusClosed { .. } => "runtime_status_closed",
            RuntimeError::ModulePanicked { .. } => "runtime_module_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::UnresolvedDependencies { modules } => {
                format!("unresolved dependencies; modules={modules:?}")
            }
            RuntimeError::StartupTimeout { module, timeout } => {
                format!("startup timeout after {timeout:?}; module={module}")
            }
            RuntimeError::MissingStatus { module } => format!("missing status; module={module}"),
            RuntimeError::StatusClosed { module } => format!("status closed; module={module}"),
            RuntimeError::ModulePanicked { module, info } => {
                format!("panic: {info}; module={module}")
            }
        }
    }

    /// Name of the module the error is attributed to, if any.
    pub fn module(&self) -> Option<&str> {
        match self {
            RuntimeError::UnresolvedDependencies { .. } => None,
            RuntimeError::StartupTimeout { module, .. }
            | RuntimeError::MissingStatus { module }
            | RuntimeError::StatusClosed { module }
            | RuntimeError::ModulePanicked { module, .. } => Some(module),
        }
    }
}
