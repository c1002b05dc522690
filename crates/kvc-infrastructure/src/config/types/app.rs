//! Root configuration

use super::{
    CacheConfig, CircuitBreakerConfig, ConnectionConfig, HealthConfig, LockConfig, LoggingConfig,
    MetricsConfig, PoolConfig, RetryConfig,
};
use serde::{Deserialize, Serialize};

/// Configuration of the coordination layer
///
/// Every section falls back to its defaults when omitted from the file
/// and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store address, credentials and timeouts
    pub connection: ConnectionConfig,
    /// Connection pool sizing
    pub pool: PoolConfig,
    /// Cache repository settings
    pub cache: CacheConfig,
    /// Breaker guarding the lock service
    pub circuit_breaker: CircuitBreakerConfig,
    /// Retry policy for generic store operations
    pub retry: RetryConfig,
    /// Lock defaults
    pub lock: LockConfig,
    /// Health probe settings
    pub health: HealthConfig,
    /// Metrics polling settings
    pub metrics: MetricsConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}
