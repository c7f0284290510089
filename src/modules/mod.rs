//! # Module abstractions and status cells.
//!
//! - [`Module`] - trait for long-running, cancelable units
//! - [`ModuleFn`] - function-backed module implementation
//! - [`ModuleRef`] - shared reference to a module (`Arc<dyn Module>`)
//! - [`ModuleStatus`], [`Status`], [`StatusWatch`] - observable lifecycle state

mod module;
mod module_fn;
mod status;

pub use module::{Module, ModuleRef};
pub use module_fn::ModuleFn;
pub use status::{ModuleStatus, Status, StatusWatch};
