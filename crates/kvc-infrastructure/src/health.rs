//! Store health indicator
//!
//! A bounded-latency ping producing a fresh [`HealthSnapshot`] on every
//! call. Never fails: errors and timeouts become DOWN snapshots carrying the
//! error class and message.

use crate::config::HealthConfig;
use crate::connection::ConnectionProvider;
use crate::logging::log_health_check;
use crate::utils::{TimedOperation, millis};
use async_trait::async_trait;
use kvc_domain::value_objects::{HealthSnapshot, StoreOperation};
use std::sync::Arc;
use std::time::Duration;

/// Source reported for a failed ping
pub const SOURCE_PING_ERROR: &str = "active_ping_error";

/// Source reported when the ping did not answer in time
pub const SOURCE_PING_TIMEOUT: &str = "ping_timeout";

/// Health check function trait
///
/// # Example
///
/// ```ignore
/// use kvc_infrastructure::health::HealthChecker;
///
/// let snapshot = indicator.check_health().await;
/// println!("{}", serde_json::to_string(&snapshot)?);
/// ```
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// Component name used in logs
    fn component(&self) -> &str;

    /// Perform a health check
    async fn check_health(&self) -> HealthSnapshot;
}

/// Health indicator for the shared store
#[derive(Debug, Clone)]
pub struct HealthIndicator {
    provider: Arc<ConnectionProvider>,
    timeout: Duration,
}

impl HealthIndicator {
    /// Create an indicator with the configured probe timeout
    pub fn new(provider: Arc<ConnectionProvider>, config: &HealthConfig) -> Self {
        Self {
            provider,
            timeout: config.timeout(),
        }
    }

    /// Probe timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ping the store and report its health
    pub async fn health(&self) -> HealthSnapshot {
        let backend = self.provider.backend_name().to_string();
        let timer = TimedOperation::start();

        let probe = self
            .provider
            .execute(StoreOperation::Ping, |store| async move { store.ping().await });
        let snapshot = match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(())) => HealthSnapshot::up(backend, timer.elapsed()),
            Ok(Err(e)) => HealthSnapshot::down(backend, SOURCE_PING_ERROR, e.kind(), e.to_string()),
            Err(_) => HealthSnapshot::down(
                backend,
                SOURCE_PING_TIMEOUT,
                "Timeout",
                format!("health probe timed out after {}ms", millis(self.timeout)),
            ),
        };

        log_health_check(
            self.component(),
            snapshot.is_healthy(),
            Some(snapshot.message.as_str()),
        );
        snapshot
    }
}

#[async_trait]
impl HealthChecker for HealthIndicator {
    fn component(&self) -> &str {
        "store"
    }

    async fn check_health(&self) -> HealthSnapshot {
        self.health().await
    }
}
