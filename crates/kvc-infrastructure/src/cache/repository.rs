//! Cache repository implementation

use crate::config::CacheConfig;
use crate::connection::ConnectionProvider;
use crate::metrics::StoreMetrics;
use crate::utils::millis;
use kvc_domain::constants::KEY_SEPARATOR;
use kvc_domain::error::{Error, Result, validate_key};
use kvc_domain::value_objects::StoreOperation;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Typed cache over the shared store
///
/// Keys are prefixed with `cache.key_prefix` when configured. Transient
/// store failures are retried by the connection provider; what remains is
/// returned as an error so callers can tell a miss from an outage.
#[derive(Debug, Clone)]
pub struct CacheRepository {
    provider: Arc<ConnectionProvider>,
    metrics: StoreMetrics,
    key_prefix: Option<String>,
    default_ttl: Option<Duration>,
}

impl CacheRepository {
    /// Create a repository
    pub fn new(provider: Arc<ConnectionProvider>, metrics: StoreMetrics, config: &CacheConfig) -> Self {
        Self {
            provider,
            metrics,
            key_prefix: config
                .key_prefix
                .clone()
                .filter(|prefix| !prefix.trim().is_empty()),
            default_ttl: config.default_ttl(),
        }
    }

    /// Get a value; `None` on a miss or an expired entry
    ///
    /// A stored value that no longer deserializes as `T` is deleted and
    /// reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let full_key = self.full_key(key)?;
        let raw = self
            .metrics
            .time(StoreOperation::Get, self.provider.execute_with_retry(StoreOperation::Get, |store| {
                let full_key = full_key.as_str();
                async move { store.get(full_key).await }
            }))
            .await?;

        let Some(raw) = raw else {
            debug!(key = %full_key, "Cache miss");
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %full_key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key = %full_key, error = %e, "Dropping undecodable cache entry");
                if let Err(e) = self.remove(&full_key).await {
                    warn!(key = %full_key, error = %e, "Failed to delete undecodable cache entry");
                }
                Ok(None)
            }
        }
    }

    /// Store a value
    ///
    /// `ttl = None` falls back to `cache.default_ttl_secs`; without one the
    /// entry persists until deleted.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<bool> {
        let full_key = self.full_key(key)?;
        let ttl = ttl.or(self.default_ttl);
        if ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(Error::invalid_argument("cache TTL must be greater than zero"));
        }
        let json = serde_json::to_string(value)?;

        self.metrics
            .time(StoreOperation::Set, self.provider.execute_with_retry(StoreOperation::Set, |store| {
                let (full_key, json) = (full_key.as_str(), json.as_str());
                async move { store.set(full_key, json, ttl).await }
            }))
            .await?;

        debug!(key = %full_key, ttl_ms = ttl.map(millis), "Cache entry stored");
        Ok(true)
    }

    /// Delete a value; `false` when it did not exist
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key)?;
        self.remove(&full_key).await
    }

    /// Whether a live entry exists
    pub async fn has_key(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key)?;
        self.provider
            .execute_with_retry(StoreOperation::Exists, |store| {
                let full_key = full_key.as_str();
                async move { store.exists(full_key).await }
            })
            .await
    }

    /// Replace the TTL of an existing entry; `false` when it does not exist
    pub async fn update_ttl(&self, key: &str, ttl: Duration) -> Result<bool> {
        let full_key = self.full_key(key)?;
        if ttl.is_zero() {
            return Err(Error::invalid_argument("cache TTL must be greater than zero"));
        }
        self.provider
            .execute_with_retry(StoreOperation::Expire, |store| {
                let full_key = full_key.as_str();
                async move { store.expire(full_key, ttl).await }
            })
            .await
    }

    /// Remaining TTL; `None` for missing or persistent entries
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let full_key = self.full_key(key)?;
        self.provider
            .execute_with_retry(StoreOperation::Ttl, |store| {
                let full_key = full_key.as_str();
                async move { store.ttl(full_key).await }
            })
            .await
    }

    /// Values found for `keys`, in order, skipping misses
    pub async fn get_many<T, K>(&self, keys: &[K]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        let lookups = keys.iter().map(|key| self.get::<T>(key.as_ref()));
        let found = futures::future::try_join_all(lookups).await?;
        Ok(found.into_iter().flatten().collect())
    }

    /// Cache-aside read: the cached value, or `loader`'s result stored under `key`
    ///
    /// Cache failures degrade to calling `loader`; only the loader's own
    /// error is returned.
    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        loader: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        match self.get::<T>(key).await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) if e.is_validation() => return Err(e.into()),
            Err(e) => warn!(key, error = %e, "Cache read failed, loading from source"),
        }

        let value = loader().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            warn!(key, error = %e, "Failed to cache loaded value");
        }
        Ok(value)
    }

    /// `prefix:identifier`
    pub fn generate_key(prefix: &str, identifier: &str) -> String {
        super::keys::generate_key(prefix, identifier)
    }

    /// `prefix:sha256-hex(content)`
    pub fn content_key<C: AsRef<[u8]>>(prefix: &str, content: C) -> String {
        super::keys::content_key(prefix, content)
    }

    async fn remove(&self, full_key: &str) -> Result<bool> {
        self.metrics
            .time(StoreOperation::Delete, self.provider.execute_with_retry(StoreOperation::Delete, |store| async move {
                store.delete(full_key).await
            }))
            .await
    }

    fn full_key(&self, key: &str) -> Result<String> {
        validate_key("cache key", key)?;
        Ok(match &self.key_prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.to_string(),
        })
    }
}
