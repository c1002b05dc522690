//! In-memory store provider
//!
//! Process-local implementation of the store port. Expired entries are
//! treated as absent on every read and removed lazily. Leases follow the
//! same NX / compare-and-delete rules as the Redis backend, so lock
//! semantics can be exercised without a server.
//!
//! Outages and latency can be injected to drive failure paths:
//!
//! ```ignore
//! let store = InMemoryStore::new();
//! store.simulate_outage(true);   // every call fails with a connection error
//! store.simulate_latency(Duration::from_secs(3));
//! ```

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use kvc_domain::error::{Error, Result};
use kvc_domain::ports::{ChannelStream, KeyValueStore};
use kvc_domain::value_objects::{ChannelMessage, StoreOperation};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Buffered messages per channel before slow subscribers start lagging
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: &str, ttl: Option<Duration>, now: Instant) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

#[derive(Debug, Default)]
struct Inner {
    entries: DashMap<String, StoredValue>,
    channels: DashMap<String, broadcast::Sender<ChannelMessage>>,
    outage: AtomicBool,
    latency_ms: AtomicU64,
}

/// In-memory store provider
///
/// Clones share the same data, like several connections to one server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a connection error while `down` is true
    pub fn simulate_outage(&self, down: bool) {
        self.inner.outage.store(down, Ordering::SeqCst);
    }

    /// Delay every call by `latency`
    pub fn simulate_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.inner.latency_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .entries
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .count()
    }

    /// Whether the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply injected latency and outage before touching data
    async fn enter(&self, operation: StoreOperation) -> Result<Instant> {
        let latency = self.inner.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.inner.outage.load(Ordering::SeqCst) {
            return Err(Error::connection(operation, "Connection refused (simulated outage)"));
        }
        Ok(Instant::now())
    }

    fn live_value(&self, key: &str, now: Instant) -> Option<String> {
        let value = self
            .inner
            .entries
            .get(key)
            .map(|entry| (entry.is_live(now), entry.value.clone()));
        match value {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                self.inner.entries.remove_if(key, |_, entry| !entry.is_live(now));
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        self.enter(StoreOperation::Ping).await.map(|_| ())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.enter(StoreOperation::Get).await?;
        Ok(self.live_value(key, now))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let now = self.enter(StoreOperation::Set).await?;
        self.inner
            .entries
            .insert(key.to_string(), StoredValue::new(value, ttl, now));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let now = self.enter(StoreOperation::Delete).await?;
        Ok(self
            .inner
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = self.enter(StoreOperation::Exists).await?;
        Ok(self.live_value(key, now).is_some())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = self.enter(StoreOperation::Expire).await?;
        match self.inner.entries.get_mut(key) {
            Some(mut entry) if entry.is_live(now) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = self.enter(StoreOperation::Ttl).await?;
        Ok(self.inner.entries.get(key).and_then(|entry| {
            if entry.is_live(now) {
                entry.expires_at.map(|at| at.saturating_duration_since(now))
            } else {
                None
            }
        }))
    }

    async fn try_acquire_lease(&self, key: &str, token: &str, lease: Duration) -> Result<bool> {
        let now = self.enter(StoreOperation::AcquireLease).await?;
        let lease = StoredValue::new(token, Some(lease), now);
        match self.inner.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    Ok(false)
                } else {
                    occupied.insert(lease);
                    Ok(true)
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(lease);
                Ok(true)
            }
        }
    }

    async fn release_lease(&self, key: &str, token: &str) -> Result<bool> {
        let now = self.enter(StoreOperation::ReleaseLease).await?;
        Ok(self
            .inner
            .entries
            .remove_if(key, |_, entry| entry.is_live(now) && entry.value == token)
            .is_some())
    }

    async fn lease_holder(&self, key: &str) -> Result<Option<String>> {
        let now = self.enter(StoreOperation::LeaseHolder).await?;
        Ok(self.live_value(key, now))
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        self.enter(StoreOperation::Publish).await?;
        let delivered = self.inner.channels.get(channel).map_or(0, |sender| {
            sender
                .send(ChannelMessage::new(channel, message))
                .unwrap_or(0)
        });
        Ok(delivered as u64)
    }

    async fn subscribe(&self, channel: &str) -> Result<ChannelStream> {
        self.enter(StoreOperation::Subscribe).await?;
        let receiver = self
            .inner
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => return Some((message, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
