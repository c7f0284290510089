//! # Manager configuration.
//!
//! Provides [`ManagerConfig`] centralized settings for the module manager.
//!
//! ## Sentinel values
//! - `ready_timeout = 0s` → clamped to 1ms (a zero window would fail every start)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Global configuration for the module manager.
///
/// ## Field semantics
/// - `ready_timeout`: how long one module may take to report its first transition
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Readiness window per module during startup.
    ///
    /// Exceeding it aborts the whole startup with
    /// [`RuntimeError::StartupTimeout`](crate::RuntimeError::StartupTimeout).
    pub ready_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl ManagerConfig {
    /// Returns the readiness window clamped to a minimum of 1ms.
    #[inline]
    pub fn ready_timeout_clamped(&self) -> Duration {
        self.ready_timeout.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `ready_timeout = 1s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}
