//! Health Indicator Tests

use crate::test_utils::{fast_config, memory_context};
use kvc_domain::value_objects::HealthStatus;
use kvc_infrastructure::health::{HealthChecker, SOURCE_PING_ERROR, SOURCE_PING_TIMEOUT};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_health_up_reports_latency() {
    let (context, _store) = memory_context(fast_config()).await;

    let snapshot = context.health().health().await;

    assert_eq!(snapshot.status, HealthStatus::Up);
    assert!(snapshot.latency_ms.is_some());
    assert!(snapshot.error_kind.is_none());
    assert_eq!(snapshot.backend, "memory");
    assert_eq!(snapshot.source, "active_ping");
}

#[tokio::test]
async fn test_health_down_during_outage() {
    let (context, store) = memory_context(fast_config()).await;
    store.simulate_outage(true);

    let snapshot = context.health().health().await;

    assert_eq!(snapshot.status, HealthStatus::Down);
    assert_eq!(snapshot.source, SOURCE_PING_ERROR);
    assert_eq!(snapshot.error_kind.as_deref(), Some("ConnectionError"));
    assert!(snapshot.message.contains("simulated outage"));
    assert!(snapshot.latency_ms.is_none());
}

#[tokio::test]
async fn test_health_down_when_probe_times_out() {
    let (context, store) = memory_context(fast_config()).await;
    store.simulate_latency(Duration::from_secs(3));

    let started = Instant::now();
    let snapshot = context.health().health().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(snapshot.status, HealthStatus::Down);
    assert_eq!(snapshot.source, SOURCE_PING_TIMEOUT);
    assert_eq!(snapshot.error_kind.as_deref(), Some("Timeout"));
    assert_eq!(snapshot.message, "health probe timed out after 300ms");
}

#[tokio::test]
async fn test_each_probe_is_fresh() {
    let (context, store) = memory_context(fast_config()).await;
    let health = context.health();

    assert!(health.health().await.is_healthy());
    store.simulate_outage(true);
    assert!(!health.health().await.is_healthy());
    store.simulate_outage(false);
    assert!(health.health().await.is_healthy());
}

#[tokio::test]
async fn test_checker_trait_delegates() {
    let (context, _store) = memory_context(fast_config()).await;
    let checker: &dyn HealthChecker = context.health();

    assert_eq!(checker.component(), "store");
    assert!(checker.check_health().await.is_healthy());
}

#[tokio::test]
async fn test_snapshot_serializes_status_uppercase() {
    let (context, store) = memory_context(fast_config()).await;
    store.simulate_outage(true);

    let json = serde_json::to_value(context.health().health().await).unwrap();
    assert_eq!(json["status"], "DOWN");
    assert_eq!(json["backend"], "memory");
}
