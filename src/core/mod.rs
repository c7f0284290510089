//! Runtime core: ordering, startup and shutdown.
//!
//! The public API from this module is [`Manager`] (with [`ManagerBuilder`] and
//! [`ManagerConfig`]) plus the [`wait_for_shutdown_signal`] helper.
//!
//! Internal modules:
//! - [`graph`]: start-order resolution with cycle detection;
//! - [`runner`]: spawns one module with panic escalation;
//! - [`manager`]: registry, startup walk, shutdown barrier;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod graph;
mod manager;
mod runner;
mod shutdown;

pub use builder::ManagerBuilder;
pub use config::ManagerConfig;
pub use manager::Manager;
pub use shutdown::wait_for_shutdown_signal;

pub(crate) use runner::panic_message;
