//! Tests for domain value objects

use kvc_domain::{CriticalSection, HealthSnapshot, HealthStatus, LockOutcome};
use std::time::Duration;

#[test]
fn test_lock_outcome_boolean_view() {
    assert!(LockOutcome::Acquired.is_acquired());
    assert!(!LockOutcome::Contended.is_acquired());
    assert!(!LockOutcome::Unavailable.is_acquired());
}

#[test]
fn test_critical_section_into_option() {
    assert_eq!(CriticalSection::Completed(5).into_option(), Some(5));
    assert_eq!(CriticalSection::<i32>::Contended.into_option(), None);
    assert_eq!(CriticalSection::<i32>::Unavailable.into_option(), None);
}

#[test]
fn test_critical_section_map_keeps_variant() {
    assert_eq!(
        CriticalSection::Completed(2).map(|v| v * 10),
        CriticalSection::Completed(20)
    );
    assert_eq!(
        CriticalSection::<i32>::Contended.map(|v| v * 10),
        CriticalSection::Contended
    );
}

#[test]
fn test_health_snapshot_up() {
    let snapshot = HealthSnapshot::up("memory", Duration::from_millis(3));
    assert_eq!(snapshot.status, HealthStatus::Up);
    assert_eq!(snapshot.latency_ms, Some(3));
    assert!(snapshot.error_kind.is_none());
}

#[test]
fn test_health_snapshot_down_serializes_status() {
    let snapshot = HealthSnapshot::down("redis", "ping_timeout", "Timeout", "no answer");
    assert!(!snapshot.is_healthy());
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["status"], "DOWN");
    assert_eq!(json["error_kind"], "Timeout");
}
