//! Health and metrics configuration types

use crate::constants::METRICS_POLL_INTERVAL_SECS;
use kvc_domain::constants::DEFAULT_HEALTH_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Probe timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_HEALTH_TIMEOUT_MS,
        }
    }
}

impl HealthConfig {
    /// Probe timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether the connection status polling loop runs
    pub enabled: bool,

    /// Polling interval in seconds
    pub poll_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: METRICS_POLL_INTERVAL_SECS,
        }
    }
}

impl MetricsConfig {
    /// Polling interval as a Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
