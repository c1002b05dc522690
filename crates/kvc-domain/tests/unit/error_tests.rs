//! Tests for the domain error taxonomy

use kvc_domain::error::{Error, validate_key};
use kvc_domain::StoreOperation;
use std::time::Duration;

#[test]
fn test_connectivity_errors_are_transient() {
    assert!(Error::connection(StoreOperation::Get, "refused").is_transient());
    assert!(Error::timeout(StoreOperation::Ping, Duration::from_millis(20)).is_transient());
    assert!(Error::PoolExhausted { waited_ms: 10 }.is_transient());
}

#[test]
fn test_logical_errors_are_not_transient() {
    assert!(!Error::store(StoreOperation::Get, "WRONGTYPE").is_transient());
    assert!(!Error::invalid_argument("empty").is_transient());
    assert!(!Error::circuit_open("redisLock").is_transient());
}

#[test]
fn test_error_kind_names() {
    assert_eq!(Error::invalid_argument("x").kind(), "InvalidArgument");
    assert_eq!(Error::circuit_open("b").kind(), "CircuitOpen");
    assert_eq!(
        Error::timeout(StoreOperation::Set, Duration::from_secs(1)).kind(),
        "Timeout"
    );
}

#[test]
fn test_timeout_message_mentions_operation() {
    let err = Error::timeout(StoreOperation::AcquireLease, Duration::from_millis(1500));
    assert_eq!(err.to_string(), "acquire_lease timed out after 1500ms");
}

#[test]
fn test_validate_key_rejects_blank() {
    assert!(validate_key("lock key", "").unwrap_err().is_validation());
    assert!(validate_key("lock key", "   ").is_err());
    assert!(validate_key("lock key", "job-42").is_ok());
}
