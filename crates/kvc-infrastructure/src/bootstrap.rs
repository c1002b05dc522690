//! Component wiring
//!
//! Builds every coordination service from one validated configuration.

use crate::cache::CacheRepository;
use crate::config::StoreConfig;
use crate::config::loader::validate_config;
use crate::connection::ConnectionProvider;
use crate::health::HealthIndicator;
use crate::lock::LockService;
use crate::metrics::{MetricsService, MonitorHandle, StoreMetrics};
use crate::resilience::{CircuitGuard, guard_from_config};
use kvc_domain::error::Result;
use kvc_domain::ports::KeyValueStore;
use kvc_providers::RedisStore;
use std::sync::Arc;
use tracing::{info, warn};

/// The coordination services sharing one store connection
#[derive(Debug, Clone)]
pub struct CoordinationContext {
    config: Arc<StoreConfig>,
    provider: Arc<ConnectionProvider>,
    breaker: Arc<dyn CircuitGuard>,
    locks: LockService,
    cache: CacheRepository,
    health: HealthIndicator,
    metrics: StoreMetrics,
}

impl CoordinationContext {
    /// Connect to Redis using `config.connection`
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        validate_config(&config)?;
        let store = RedisStore::new(&config.connection.redis_url()?)?
            .with_connect_timeout(config.connection.connect_timeout());
        info!(server = store.server_address(), "Using Redis store");
        Self::with_store(config, Arc::new(store)).await
    }

    /// Build the services over an existing store
    pub async fn with_store(config: StoreConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        validate_config(&config)?;
        let config = Arc::new(config);

        let provider = Arc::new(ConnectionProvider::new(store, &config));
        if config.pool.enabled && config.pool.min_idle > 0 {
            if let Err(e) = provider.warm_up().await {
                warn!(error = %e, "Store warm-up failed, connecting on first use");
            }
        }

        let breaker = guard_from_config(&config.circuit_breaker);
        let metrics = StoreMetrics::new();
        let locks = LockService::new(Arc::clone(&provider), Arc::clone(&breaker), &config.lock);
        let cache = CacheRepository::new(Arc::clone(&provider), metrics.clone(), &config.cache);
        let health = HealthIndicator::new(Arc::clone(&provider), &config.health);

        info!(
            backend = provider.backend_name(),
            breaker = breaker.name(),
            breaker_enabled = config.circuit_breaker.enabled,
            "Coordination context ready"
        );

        Ok(Self {
            config,
            provider,
            breaker,
            locks,
            cache,
            health,
            metrics,
        })
    }

    /// Start the connection status monitor when metrics are enabled
    pub fn start_metrics(&self) -> Option<MonitorHandle> {
        self.config.metrics.enabled.then(|| {
            MetricsService::new(Arc::clone(&self.provider), self.metrics.clone(), &self.config.metrics)
                .spawn()
        })
    }

    /// Shared configuration
    pub fn config(&self) -> &Arc<StoreConfig> {
        &self.config
    }

    /// Connection provider
    pub fn provider(&self) -> &Arc<ConnectionProvider> {
        &self.provider
    }

    /// Breaker guarding the lock service
    pub fn breaker(&self) -> &Arc<dyn CircuitGuard> {
        &self.breaker
    }

    /// Lock service of this context's calling context
    pub fn locks(&self) -> &LockService {
        &self.locks
    }

    /// Cache repository
    pub fn cache(&self) -> &CacheRepository {
        &self.cache
    }

    /// Health indicator
    pub fn health(&self) -> &HealthIndicator {
        &self.health
    }

    /// Store metrics
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }
}
