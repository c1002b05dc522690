//! Shared fixtures for integration tests

use async_trait::async_trait;
use kvc_domain::error::{Error, Result};
use kvc_domain::ports::{ChannelStream, KeyValueStore};
use kvc_domain::value_objects::StoreOperation;
use kvc_infrastructure::CoordinationContext;
use kvc_infrastructure::config::StoreConfig;
use kvc_providers::InMemoryStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Configuration with short timings so failure paths finish quickly
pub fn fast_config() -> StoreConfig {
    let mut config = StoreConfig::default();
    config.connection.connect_timeout_ms = 200;
    config.connection.command_timeout_ms = 500;
    config.retry.backoff_ms = 5;
    config.lock.retry_interval_ms = 10;
    config.health.timeout_ms = 300;
    config.metrics.enabled = false;
    config
}

/// Context over a fresh in-memory store
pub async fn memory_context(config: StoreConfig) -> (CoordinationContext, InMemoryStore) {
    let store = InMemoryStore::new();
    let context = CoordinationContext::with_store(config, Arc::new(store.clone()))
        .await
        .expect("valid test configuration");
    (context, store)
}

/// Context over a counting wrapper around a fresh in-memory store
pub async fn counting_context(config: StoreConfig) -> (CoordinationContext, CountingStore) {
    let store = CountingStore::new(InMemoryStore::new());
    let context = CoordinationContext::with_store(config, Arc::new(store.clone()))
        .await
        .expect("valid test configuration");
    (context, store)
}

/// Store wrapper counting lease calls, with deletes that can be made to fail
#[derive(Debug, Clone)]
pub struct CountingStore {
    inner: InMemoryStore,
    acquires: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    failing_deletes: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            acquires: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
            failing_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_deletes(&self, failing: bool) {
        self.failing_deletes.store(failing, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        if self.failing_deletes.load(Ordering::SeqCst) {
            return Err(Error::connection(StoreOperation::Delete, "Connection reset by peer"));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.inner.expire(key, ttl).await
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.inner.ttl(key).await
    }

    async fn try_acquire_lease(&self, key: &str, token: &str, lease: Duration) -> Result<bool> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.inner.try_acquire_lease(key, token, lease).await
    }

    async fn release_lease(&self, key: &str, token: &str) -> Result<bool> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release_lease(key, token).await
    }

    async fn lease_holder(&self, key: &str) -> Result<Option<String>> {
        self.inner.lease_holder(key).await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        self.inner.publish(channel, message).await
    }

    async fn subscribe(&self, channel: &str) -> Result<ChannelStream> {
        self.inner.subscribe(channel).await
    }

    fn backend_name(&self) -> &str {
        self.inner.backend_name()
    }
}
