//! Coordination context wiring tests

use crate::test_utils::fast_config;
use kvc_infrastructure::CoordinationContext;
use kvc_providers::InMemoryStore;
use std::sync::Arc;

#[tokio::test]
async fn test_with_store_rejects_invalid_config() {
    let mut config = fast_config();
    config.connection.port = 0;

    let result = CoordinationContext::with_store(config, Arc::new(InMemoryStore::new())).await;
    assert_eq!(result.unwrap_err().kind(), "ConfigurationError");
}

#[tokio::test]
async fn test_warm_up_failure_does_not_block_startup() {
    let mut config = fast_config();
    config.pool.min_idle = 1;
    let store = InMemoryStore::new();
    store.simulate_outage(true);

    let context = CoordinationContext::with_store(config, Arc::new(store.clone()))
        .await
        .unwrap();

    assert!(!context.health().health().await.is_healthy());
    store.simulate_outage(false);
    assert!(context.health().health().await.is_healthy());
}

#[tokio::test]
async fn test_connect_to_unreachable_redis_reports_down() {
    let mut config = fast_config();
    config.connection.host = "127.0.0.1".to_string();
    config.connection.port = 1;

    let context = CoordinationContext::connect(config).await.unwrap();

    assert_eq!(context.provider().backend_name(), "redis");
    let snapshot = context.health().health().await;
    assert!(!snapshot.is_healthy());
    assert!(!context.provider().is_available().await);
}

#[tokio::test]
async fn test_services_share_one_configuration() {
    let (context, _store) = crate::test_utils::memory_context(fast_config()).await;

    assert_eq!(context.config().lock.retry_interval_ms, 10);
    assert_eq!(context.breaker().name(), context.config().circuit_breaker.name);
    assert_eq!(context.health().timeout(), std::time::Duration::from_millis(300));
}
