//! Pooled, time-bounded access to the store

use crate::config::StoreConfig;
use crate::connection::Subscription;
use crate::resilience::RetryPolicy;
use crate::utils::millis;
use kvc_domain::error::{Error, Result, validate_key};
use kvc_domain::ports::KeyValueStore;
use kvc_domain::value_objects::StoreOperation;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

/// Connection provider
///
/// The store connection is shared by all callers. `pool.max_active` bounds
/// concurrent in-flight calls; a caller waits at most `pool.max_wait_ms`
/// for a free slot before failing with `PoolExhausted`.
#[derive(Clone)]
pub struct ConnectionProvider {
    store: Arc<dyn KeyValueStore>,
    connect_timeout: Duration,
    command_timeout: Duration,
    subscribe_timeout: Duration,
    slots: Option<Arc<Semaphore>>,
    max_wait: Duration,
    retry: RetryPolicy,
}

impl ConnectionProvider {
    /// Create a provider over `store`
    pub fn new(store: Arc<dyn KeyValueStore>, config: &StoreConfig) -> Self {
        let slots = config
            .pool
            .enabled
            .then(|| Arc::new(Semaphore::new(config.pool.max_active.max(1))));

        Self {
            store,
            connect_timeout: config.connection.connect_timeout(),
            command_timeout: config.connection.command_timeout(),
            subscribe_timeout: config.connection.subscribe_timeout(),
            slots,
            max_wait: config.pool.max_wait(),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }

    /// Raw store port
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Backend identifier ("redis", "memory")
    pub fn backend_name(&self) -> &str {
        self.store.backend_name()
    }

    /// Per-command timeout
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Free call slots, `None` when the pool is disabled
    pub fn available_slots(&self) -> Option<usize> {
        self.slots.as_ref().map(|slots| slots.available_permits())
    }

    /// Ping the store within the connect timeout
    ///
    /// Any failure, including the timeout itself, yields `false`.
    pub async fn is_available(&self) -> bool {
        let store = Arc::clone(&self.store);
        match self
            .attempt(StoreOperation::Ping, self.connect_timeout, store.ping())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Store availability check failed");
                false
            }
        }
    }

    /// Run one store operation
    ///
    /// The call is bounded by the command timeout and occupies one pool
    /// slot while in flight. Failures are logged and returned unchanged;
    /// callers apply their own breaker or retry policy.
    pub async fn execute<T, F, Fut>(&self, operation: StoreOperation, command: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn KeyValueStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = self
            .attempt(operation, self.command_timeout, command(Arc::clone(&self.store)))
            .await;
        if let Err(e) = &result {
            log_failure(operation, e);
        }
        result
    }

    /// Run one store operation, retrying transient failures
    ///
    /// Retries follow `retry.max_attempts` and `retry.backoff_ms` with
    /// exponential backoff. Non-transient failures are returned at once.
    pub async fn execute_with_retry<T, F, Fut>(
        &self,
        operation: StoreOperation,
        command: F,
    ) -> Result<T>
    where
        F: Fn(Arc<dyn KeyValueStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = self
            .retry
            .run(operation.as_str(), move || {
                self.attempt(operation, self.command_timeout, command(Arc::clone(&self.store)))
            })
            .await;
        if let Err(e) = &result {
            log_failure(operation, e);
        }
        result
    }

    /// Publish a message on a channel
    pub async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        validate_key("channel", channel)?;
        self.execute(StoreOperation::Publish, |store| async move {
            store.publish(channel, message).await
        })
        .await
    }

    /// Subscribe to a channel
    ///
    /// The returned stream yields messages until it is cancelled or
    /// dropped, which tears the subscription down. Subscriptions use their
    /// own connection and do not occupy a pool slot. Opening one is bounded
    /// by `connection.subscribe_timeout_ms`.
    pub async fn subscribe_to_channel(&self, channel: &str) -> Result<Subscription> {
        validate_key("channel", channel)?;
        let stream = tokio::time::timeout(self.subscribe_timeout, self.store.subscribe(channel))
            .await
            .map_err(|_| Error::timeout(StoreOperation::Subscribe, self.subscribe_timeout))?
            .inspect_err(|e| log_failure(StoreOperation::Subscribe, e))?;

        info!(channel, backend = self.backend_name(), "Subscribed to channel");
        Ok(Subscription::new(channel, stream))
    }

    /// Open the shared connection eagerly
    pub async fn warm_up(&self) -> Result<()> {
        self.execute(StoreOperation::Connect, |store| async move { store.ping().await })
            .await
            .inspect(|()| debug!(backend = self.backend_name(), "Store connection warmed up"))
    }

    async fn attempt<T, Fut>(
        &self,
        operation: StoreOperation,
        timeout: Duration,
        command: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _slot = self.acquire_slot().await?;
        tokio::time::timeout(timeout, command)
            .await
            .map_err(|_| Error::timeout(operation, timeout))?
    }

    async fn acquire_slot(&self) -> Result<Option<OwnedSemaphorePermit>> {
        let Some(slots) = &self.slots else {
            return Ok(None);
        };
        match tokio::time::timeout(self.max_wait, Arc::clone(slots).acquire_owned()).await {
            Ok(Ok(permit)) => Ok(Some(permit)),
            Ok(Err(_)) => Err(Error::internal("Connection pool closed")),
            Err(_) => {
                warn!(waited_ms = millis(self.max_wait), "No store connection slot available");
                Err(Error::PoolExhausted {
                    waited_ms: millis(self.max_wait),
                })
            }
        }
    }
}

fn log_failure(operation: StoreOperation, error: &Error) {
    if error.is_validation() {
        return;
    }
    error!(operation = %operation, error_kind = error.kind(), error = %error, "Store operation failed");
}

impl std::fmt::Debug for ConnectionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProvider")
            .field("store", &self.store)
            .field("command_timeout", &self.command_timeout)
            .field("available_slots", &self.available_slots())
            .finish_non_exhaustive()
    }
}
