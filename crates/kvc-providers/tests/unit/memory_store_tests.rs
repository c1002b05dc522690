//! Tests for the in-memory store

use futures::StreamExt;
use kvc_domain::KeyValueStore;
use kvc_providers::InMemoryStore;
use std::time::Duration;

#[tokio::test]
async fn test_set_get_delete() {
    let store = InMemoryStore::new();

    store.set("a", "1", None).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    assert!(store.exists("a").await.unwrap());

    assert!(store.delete("a").await.unwrap());
    assert!(store.get("a").await.unwrap().is_none());
    assert!(!store.delete("a").await.unwrap());
}

#[tokio::test]
async fn test_entries_expire() {
    let store = InMemoryStore::new();
    store
        .set("short", "v", Some(Duration::from_millis(50)))
        .await
        .unwrap();

    assert_eq!(store.get("short").await.unwrap().as_deref(), Some("v"));
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(store.get("short").await.unwrap().is_none());
    assert!(!store.exists("short").await.unwrap());
    assert!(!store.delete("short").await.unwrap());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_ttl_and_expire() {
    let store = InMemoryStore::new();
    store.set("persistent", "v", None).await.unwrap();
    assert!(store.ttl("persistent").await.unwrap().is_none());

    assert!(store.expire("persistent", Duration::from_secs(60)).await.unwrap());
    let ttl = store.ttl("persistent").await.unwrap().unwrap();
    assert!(ttl <= Duration::from_secs(60));
    assert!(ttl > Duration::from_secs(55));

    assert!(!store.expire("missing", Duration::from_secs(1)).await.unwrap());
    assert!(store.ttl("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_lease_is_exclusive() {
    let store = InMemoryStore::new();
    let lease = Duration::from_secs(5);

    assert!(store.try_acquire_lease("job", "a", lease).await.unwrap());
    assert!(!store.try_acquire_lease("job", "b", lease).await.unwrap());
    assert_eq!(store.lease_holder("job").await.unwrap().as_deref(), Some("a"));
}

#[tokio::test]
async fn test_release_requires_matching_token() {
    let store = InMemoryStore::new();
    let lease = Duration::from_secs(5);
    store.try_acquire_lease("job", "a", lease).await.unwrap();

    assert!(!store.release_lease("job", "b").await.unwrap());
    assert!(store.lease_holder("job").await.unwrap().is_some());

    assert!(store.release_lease("job", "a").await.unwrap());
    assert!(store.lease_holder("job").await.unwrap().is_none());
    assert!(store.try_acquire_lease("job", "b", lease).await.unwrap());
}

#[tokio::test]
async fn test_expired_lease_can_be_taken_over() {
    let store = InMemoryStore::new();

    assert!(store
        .try_acquire_lease("job", "a", Duration::from_millis(30))
        .await
        .unwrap());
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(store
        .try_acquire_lease("job", "b", Duration::from_secs(5))
        .await
        .unwrap());
    // The stale holder must not delete the new lease
    assert!(!store.release_lease("job", "a").await.unwrap());
    assert_eq!(store.lease_holder("job").await.unwrap().as_deref(), Some("b"));
}

#[tokio::test]
async fn test_publish_reaches_subscribers() {
    let store = InMemoryStore::new();
    assert_eq!(store.publish("events", "nobody").await.unwrap(), 0);

    let mut first = store.subscribe("events").await.unwrap();
    let mut second = store.subscribe("events").await.unwrap();

    assert_eq!(store.publish("events", "hello").await.unwrap(), 2);

    let message = first.next().await.unwrap();
    assert_eq!(message.channel, "events");
    assert_eq!(message.payload, "hello");
    assert_eq!(second.next().await.unwrap().payload, "hello");
}

#[tokio::test]
async fn test_dropped_subscriber_stops_counting() {
    let store = InMemoryStore::new();
    let subscription = store.subscribe("events").await.unwrap();
    drop(subscription);

    assert_eq!(store.publish("events", "gone").await.unwrap(), 0);
}

#[tokio::test]
async fn test_simulated_outage_fails_every_call() {
    let store = InMemoryStore::new();
    store.set("a", "1", None).await.unwrap();
    store.simulate_outage(true);

    let err = store.ping().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.kind(), "ConnectionError");
    assert!(store.get("a").await.is_err());
    assert!(store.subscribe("events").await.is_err());

    store.simulate_outage(false);
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
}

#[tokio::test]
async fn test_simulated_latency_delays_calls() {
    let store = InMemoryStore::new();
    store.simulate_latency(Duration::from_millis(50));

    let started = std::time::Instant::now();
    store.ping().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_clones_share_data() {
    let store = InMemoryStore::new();
    let other = store.clone();

    store.set("shared", "yes", None).await.unwrap();
    assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("yes"));
    assert_eq!(other.backend_name(), "memory");
}

#[tokio::test]
async fn test_sub_millisecond_ttl_expires() {
    let store = InMemoryStore::new();

    store
        .set("tiny", "v", Some(Duration::from_micros(500)))
        .await
        .unwrap();
    store.set("renewed", "v", None).await.unwrap();
    assert!(store.expire("renewed", Duration::from_micros(500)).await.unwrap());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(store.get("tiny").await.unwrap().is_none());
    assert!(store.get("renewed").await.unwrap().is_none());
}
