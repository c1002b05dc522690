//! Lock service implementation

use super::guard::LeaseGuard;
use crate::config::LockConfig;
use crate::connection::ConnectionProvider;
use crate::resilience::CircuitGuard;
use crate::utils::millis;
use dashmap::DashMap;
use kvc_domain::error::{Error, Result, validate_key};
use kvc_domain::value_objects::{CriticalSection, LockOutcome, StoreOperation};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Distributed lock service
///
/// Each instance is one calling context with its own owner id. Only the
/// context that acquired a lock can release it; clones share the context,
/// while [`new_context`](LockService::new_context) creates a separate one.
///
/// Locks are not reentrant: acquiring a key this context already holds
/// waits like any other contender.
///
/// # Example
///
/// ```ignore
/// let outcome = locks
///     .execute_with_lock("job-42", Duration::from_secs(1), Duration::from_secs(5), || async {
///         run_job().await
///     })
///     .await?;
/// if let CriticalSection::Completed(report) = outcome { /* ... */ }
/// ```
#[derive(Clone)]
pub struct LockService {
    provider: Arc<ConnectionProvider>,
    guard: Arc<dyn CircuitGuard>,
    config: LockConfig,
    owner: Arc<str>,
    nonce: Arc<AtomicU64>,
    held: Arc<DashMap<String, HeldLease>>,
}

/// Token of a lease this context acquired, with the latest instant the
/// store can still hold it
#[derive(Debug, Clone)]
struct HeldLease {
    token: String,
    expires_at: Instant,
}

impl HeldLease {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl LockService {
    /// Create a lock service for a fresh calling context
    pub fn new(
        provider: Arc<ConnectionProvider>,
        guard: Arc<dyn CircuitGuard>,
        config: &LockConfig,
    ) -> Self {
        Self {
            provider,
            guard,
            config: config.clone(),
            owner: uuid::Uuid::new_v4().to_string().into(),
            nonce: Arc::new(AtomicU64::new(0)),
            held: Arc::new(DashMap::new()),
        }
    }

    /// A separate calling context sharing the provider and breaker
    pub fn new_context(&self) -> Self {
        Self::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.guard),
            &self.config,
        )
    }

    /// Owner id of this calling context
    pub fn owner_id(&self) -> &str {
        &self.owner
    }

    /// Breaker guarding the store calls
    pub fn circuit_guard(&self) -> &Arc<dyn CircuitGuard> {
        &self.guard
    }

    /// Try to acquire `key`, waiting up to `wait`
    ///
    /// An acquired lock expires after `lease` even without release. A zero
    /// `wait` makes exactly one attempt. Errors are only returned for
    /// invalid arguments; store failures and an open breaker are reported
    /// as [`LockOutcome::Unavailable`].
    pub async fn acquire_lock(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
    ) -> Result<LockOutcome> {
        validate_key("lock key", key)?;
        if lease.is_zero() {
            return Err(Error::invalid_argument("lock lease must be greater than zero"));
        }

        let token = self.next_token();
        let deadline = Instant::now() + wait;
        let interval = self.config.retry_interval();
        debug!(key, wait_ms = millis(wait), lease_ms = millis(lease), "Acquiring lock");

        loop {
            let attempt = self
                .guarded(StoreOperation::AcquireLease, |store| {
                    let token = token.as_str();
                    async move { store.try_acquire_lease(key, token, lease).await }
                })
                .await;

            match attempt {
                Ok(true) => {
                    let now = Instant::now();
                    self.held.retain(|_, held| !held.is_expired(now));
                    self.held.insert(
                        key.to_string(),
                        HeldLease {
                            token,
                            expires_at: now + lease,
                        },
                    );
                    debug!(key, "Lock acquired");
                    return Ok(LockOutcome::Acquired);
                }
                Ok(false) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        debug!(key, "Lock not acquired within wait time");
                        return Ok(LockOutcome::Contended);
                    }
                    tokio::time::sleep(interval.min(remaining)).await;
                }
                Err(e) => {
                    log_unavailable("acquire", key, &e);
                    return Ok(LockOutcome::Unavailable);
                }
            }
        }
    }

    /// Release `key` if this context holds it
    ///
    /// Returns `false` without touching the store when the lock is not held
    /// by this context, and `false` when the lease already expired or the
    /// store call failed.
    pub async fn release_lock(&self, key: &str) -> Result<bool> {
        validate_key("lock key", key)?;

        let Some(token) = self.held_token(key) else {
            warn!(key, "Lock is not held by this context");
            return Ok(false);
        };

        let released = self
            .guarded(StoreOperation::ReleaseLease, |store| {
                let token = token.as_str();
                async move { store.release_lease(key, token).await }
            })
            .await;

        match released {
            Ok(true) => {
                self.forget(key, &token);
                debug!(key, "Lock released");
                Ok(true)
            }
            Ok(false) => {
                self.forget(key, &token);
                warn!(key, "Lock lease expired before release");
                Ok(false)
            }
            Err(e) => {
                log_unavailable("release", key, &e);
                Ok(false)
            }
        }
    }

    /// Run `operation` while holding `key`
    ///
    /// The lock is released on every exit path of `operation`: success,
    /// error, panic and cancellation. When the lock cannot be acquired the
    /// operation does not run and the outcome says why. The operation's own
    /// error is returned as `Err`.
    pub async fn execute_with_lock<T, E, F, Fut>(
        &self,
        key: &str,
        wait: Duration,
        lease: Duration,
        operation: F,
    ) -> std::result::Result<CriticalSection<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        match self.acquire_lock(key, wait, lease).await? {
            LockOutcome::Acquired => {}
            LockOutcome::Contended => return Ok(CriticalSection::Contended),
            LockOutcome::Unavailable => return Ok(CriticalSection::Unavailable),
        }

        let lease_guard = LeaseGuard::new(self, key);
        let result = operation().await;
        if !lease_guard.release().await {
            warn!(key, "Lock release after critical section failed");
        }
        result.map(CriticalSection::Completed)
    }

    /// [`execute_with_lock`](Self::execute_with_lock) with the configured
    /// default wait and lease
    pub async fn execute_with_default_lock<T, E, F, Fut>(
        &self,
        key: &str,
        operation: F,
    ) -> std::result::Result<CriticalSection<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        self.execute_with_lock(
            key,
            self.config.default_wait(),
            self.config.default_lease(),
            operation,
        )
        .await
    }

    /// Whether any context currently holds `key`
    pub async fn is_locked(&self, key: &str) -> Result<bool> {
        validate_key("lock key", key)?;
        self.guarded(StoreOperation::LeaseHolder, |store| async move {
            store.lease_holder(key).await
        })
        .await
        .map(|holder| holder.is_some())
    }

    /// Whether this context currently holds `key`
    pub async fn is_held(&self, key: &str) -> Result<bool> {
        validate_key("lock key", key)?;
        let Some(token) = self.held_token(key) else {
            return Ok(false);
        };
        let holder = self
            .guarded(StoreOperation::LeaseHolder, |store| async move {
                store.lease_holder(key).await
            })
            .await?;

        let held = holder.as_deref() == Some(token.as_str());
        if !held {
            self.forget(key, &token);
        }
        Ok(held)
    }

    /// Number of leases this context still tracks
    ///
    /// Leases left to expire are dropped on the next acquisition or on
    /// [`is_held`](Self::is_held).
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    fn held_token(&self, key: &str) -> Option<String> {
        self.held.get(key).map(|entry| entry.token.clone())
    }

    fn forget(&self, key: &str, token: &str) {
        self.held.remove_if(key, |_, held| held.token == token);
    }

    fn next_token(&self) -> String {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        format!("{}:{nonce}", self.owner)
    }

    async fn guarded<T, F, Fut>(&self, operation: StoreOperation, command: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn kvc_domain::KeyValueStore>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.guard
            .call(|| self.provider.execute(operation, command))
            .await
    }
}

fn log_unavailable(action: &str, key: &str, error: &Error) {
    match error {
        Error::CircuitOpen { name } => {
            warn!(key, breaker = %name, action, "Lock service degraded, circuit breaker is open");
        }
        _ => {
            error!(key, action, error_kind = error.kind(), error = %error, "Lock store call failed");
        }
    }
}

impl std::fmt::Debug for LockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockService")
            .field("owner", &self.owner)
            .field("held", &self.held.len())
            .field("breaker", &self.guard.name())
            .finish_non_exhaustive()
    }
}
