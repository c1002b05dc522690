//! Resilience configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Circuit breaker configuration
///
/// The breaker keeps the outcome of the last `sliding_window_size` calls.
/// Once at least `minimum_calls` are recorded and the failure rate reaches
/// `failure_rate_threshold`, it opens for `wait_duration_open_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Whether lock calls are guarded at all
    pub enabled: bool,

    /// Breaker name used in logs, errors and metric labels
    pub name: String,

    /// Failure rate in percent that opens the circuit
    pub failure_rate_threshold: f64,

    /// Number of recent calls kept in the rolling window
    pub sliding_window_size: usize,

    /// Calls required before the failure rate is evaluated
    pub minimum_calls: usize,

    /// Time the circuit stays open before admitting trial calls
    pub wait_duration_open_ms: u64,

    /// Trial calls admitted while half-open
    pub permitted_calls_half_open: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: CIRCUIT_BREAKER_NAME.to_string(),
            failure_rate_threshold: CIRCUIT_BREAKER_FAILURE_RATE,
            sliding_window_size: CIRCUIT_BREAKER_WINDOW_SIZE,
            minimum_calls: CIRCUIT_BREAKER_MINIMUM_CALLS,
            wait_duration_open_ms: CIRCUIT_BREAKER_OPEN_WAIT_MS,
            permitted_calls_half_open: CIRCUIT_BREAKER_HALF_OPEN_CALLS,
        }
    }
}

impl CircuitBreakerConfig {
    /// Open-state wait as a Duration
    pub fn wait_duration_open(&self) -> Duration {
        Duration::from_millis(self.wait_duration_open_ms)
    }
}

/// Retry configuration for generic store operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Whether transient failures are retried
    pub enabled: bool,

    /// Attempts including the first call
    pub max_attempts: u32,

    /// First retry delay in milliseconds; doubles on every retry
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: RETRY_MAX_ATTEMPTS,
            backoff_ms: RETRY_BACKOFF_MS,
        }
    }
}
