//! Constants Tests

use kvc_domain::constants::{DEFAULT_LOCK_LEASE_MS, DEFAULT_LOCK_WAIT_MS};
use kvc_infrastructure::config::StoreConfig;
use kvc_infrastructure::constants::*;

#[test]
fn test_lock_defaults() {
    assert_eq!(DEFAULT_LOCK_WAIT_MS, 2000);
    assert_eq!(DEFAULT_LOCK_LEASE_MS, 5000);

    let config = StoreConfig::default();
    assert_eq!(config.lock.default_wait_ms, DEFAULT_LOCK_WAIT_MS);
    assert_eq!(config.lock.default_lease_ms, DEFAULT_LOCK_LEASE_MS);
    assert_eq!(config.lock.retry_interval_ms, LOCK_RETRY_INTERVAL_MS);
}

#[test]
fn test_breaker_defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.circuit_breaker.name, "redisLock");
    assert!(config.circuit_breaker.enabled);
    assert!((config.circuit_breaker.failure_rate_threshold - 50.0).abs() < f64::EPSILON);
    assert_eq!(config.circuit_breaker.wait_duration_open_ms, CIRCUIT_BREAKER_OPEN_WAIT_MS);
}

#[test]
fn test_connection_defaults() {
    let config = StoreConfig::default();
    assert_eq!(config.connection.host, DEFAULT_STORE_HOST);
    assert_eq!(config.connection.port, 6379);
    assert_eq!(config.connection.database, 0);
    assert_eq!(config.connection.subscribe_timeout_ms, SUBSCRIBE_TIMEOUT_MS);
    assert_eq!(config.connection.subscribe_timeout(), std::time::Duration::from_secs(2));
    assert!(config.pool.enabled);
    assert_eq!(config.pool.max_active, POOL_MAX_ACTIVE);
}

#[test]
fn test_metrics_poll_interval_is_thirty_seconds() {
    assert_eq!(METRICS_POLL_INTERVAL_SECS, 30);
    assert_eq!(
        StoreConfig::default().metrics.poll_interval(),
        std::time::Duration::from_secs(30)
    );
}
