//! Lock configuration types

use crate::constants::LOCK_RETRY_INTERVAL_MS;
use kvc_domain::constants::{DEFAULT_LOCK_LEASE_MS, DEFAULT_LOCK_WAIT_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lock service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Wait used by the default-argument overload, in milliseconds
    pub default_wait_ms: u64,

    /// Lease used by the default-argument overload, in milliseconds
    pub default_lease_ms: u64,

    /// Pause between acquisition attempts, in milliseconds
    pub retry_interval_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            default_wait_ms: DEFAULT_LOCK_WAIT_MS,
            default_lease_ms: DEFAULT_LOCK_LEASE_MS,
            retry_interval_ms: LOCK_RETRY_INTERVAL_MS,
        }
    }
}

impl LockConfig {
    /// Default wait as a Duration
    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_wait_ms)
    }

    /// Default lease as a Duration
    pub fn default_lease(&self) -> Duration {
        Duration::from_millis(self.default_lease_ms)
    }

    /// Retry interval as a Duration
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}
