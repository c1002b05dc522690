//! Cache repository tests

use crate::test_utils::{counting_context, fast_config, memory_context};
use kvc_domain::error::Error;
use kvc_domain::ports::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u32,
    name: String,
}

fn profile() -> Profile {
    Profile {
        id: 7,
        name: "Ada".to_string(),
    }
}

#[tokio::test]
async fn test_set_and_get_typed_value() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();

    assert!(cache.set("profile:7", &profile(), None).await.unwrap());

    let cached: Option<Profile> = cache.get("profile:7").await.unwrap();
    assert_eq!(cached, Some(profile()));
}

#[tokio::test]
async fn test_missing_key_is_none() {
    let (context, _store) = memory_context(fast_config()).await;

    let cached: Option<Profile> = context.cache().get("absent").await.unwrap();
    assert!(cached.is_none());
}

#[tokio::test]
async fn test_entry_expires_after_ttl() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();

    cache
        .set("short", &"lived", Some(Duration::from_millis(150)))
        .await
        .unwrap();
    assert_eq!(cache.get::<String>("short").await.unwrap().as_deref(), Some("lived"));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(cache.get::<String>("short").await.unwrap().is_none());
    assert!(!cache.has_key("short").await.unwrap());
}

#[tokio::test]
async fn test_delete_reports_existence() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();

    cache.set("doomed", &1_u8, None).await.unwrap();
    assert!(cache.delete("doomed").await.unwrap());
    assert!(!cache.delete("doomed").await.unwrap());
    assert!(!cache.delete("never-set").await.unwrap());
}

#[tokio::test]
async fn test_ttl_and_update_ttl() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();

    cache.set("persistent", &true, None).await.unwrap();
    assert_eq!(cache.ttl("persistent").await.unwrap(), None);

    assert!(cache.update_ttl("persistent", Duration::from_secs(60)).await.unwrap());
    let remaining = cache.ttl("persistent").await.unwrap().unwrap();
    assert!(remaining <= Duration::from_secs(60));
    assert!(remaining > Duration::from_secs(55));

    assert!(!cache.update_ttl("absent", Duration::from_secs(60)).await.unwrap());
}

#[tokio::test]
async fn test_zero_ttl_rejected() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();

    let err = cache.set("k", &1, Some(Duration::ZERO)).await.unwrap_err();
    assert!(err.is_validation());
    assert!(cache.update_ttl("k", Duration::ZERO).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_empty_key_rejected() {
    let (context, _store) = memory_context(fast_config()).await;

    let err = context.cache().get::<String>("").await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_default_ttl_applies_when_unspecified() {
    let mut config = fast_config();
    config.cache.default_ttl_secs = Some(30);
    let (context, _store) = memory_context(config).await;
    let cache = context.cache();

    cache.set("defaulted", &"v", None).await.unwrap();
    let remaining = cache.ttl("defaulted").await.unwrap().unwrap();
    assert!(remaining <= Duration::from_secs(30));
}

#[tokio::test]
async fn test_key_prefix_namespaces_entries() {
    let mut config = fast_config();
    config.cache.key_prefix = Some("orders".to_string());
    let (context, store) = memory_context(config).await;

    context.cache().set("42", &"pending", None).await.unwrap();

    assert_eq!(store.get("orders:42").await.unwrap().as_deref(), Some("\"pending\""));
    assert!(store.get("42").await.unwrap().is_none());
}

#[tokio::test]
async fn test_undecodable_entry_is_dropped() {
    let (context, store) = memory_context(fast_config()).await;
    store.set("profile:9", "not json", None).await.unwrap();

    let cached: Option<Profile> = context.cache().get("profile:9").await.unwrap();

    assert!(cached.is_none());
    assert!(!store.exists("profile:9").await.unwrap());
}

#[tokio::test]
async fn test_undecodable_entry_is_a_miss_when_delete_fails() {
    let (context, store) = counting_context(fast_config()).await;
    store.inner().set("profile:10", "not json", None).await.unwrap();
    store.fail_deletes(true);

    let cached: Option<Profile> = context.cache().get("profile:10").await.unwrap();

    assert!(cached.is_none());
    assert!(store.inner().exists("profile:10").await.unwrap());
}

#[tokio::test]
async fn test_get_many_skips_misses() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();
    cache.set("n:1", &1_u32, None).await.unwrap();
    cache.set("n:3", &3_u32, None).await.unwrap();

    let found: Vec<u32> = cache.get_many(&["n:1", "n:2", "n:3"]).await.unwrap();
    assert_eq!(found, vec![1, 3]);
}

#[tokio::test]
async fn test_get_or_load_caches_loaded_value() {
    let (context, _store) = memory_context(fast_config()).await;
    let cache = context.cache();
    let loads = AtomicUsize::new(0);

    for _ in 0..3 {
        let value: Profile = cache
            .get_or_load("profile:7", Some(Duration::from_secs(60)), || async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(profile())
            })
            .await
            .unwrap();
        assert_eq!(value, profile());
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_or_load_survives_store_outage() {
    let (context, store) = memory_context(fast_config()).await;
    store.simulate_outage(true);

    let value: Profile = context
        .cache()
        .get_or_load("profile:7", None, || async { Ok::<_, Error>(profile()) })
        .await
        .unwrap();

    assert_eq!(value, profile());
}

#[tokio::test]
async fn test_outage_surfaces_as_transient_error() {
    let (context, store) = memory_context(fast_config()).await;
    store.simulate_outage(true);

    let err = context.cache().get::<String>("k").await.unwrap_err();
    assert!(err.is_transient());

    let err = context.cache().set("k", &"v", None).await.unwrap_err();
    assert!(err.is_transient());
}
