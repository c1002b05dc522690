//! # Infrastructure Layer
//!
//! Coordination services built on the key-value store port.
//!
//! ## Module Categories
//!
//! ### Store Access
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | Pooled, time-bounded store calls and channel subscriptions |
//! | [`lock`] | Lease-based distributed locks behind a circuit breaker |
//! | [`cache`] | Typed TTL cache with deterministic key composition |
//!
//! ### Resilience
//! | Module | Description |
//! |--------|-------------|
//! | [`resilience`] | Circuit breaker state machine and retry backoff |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based TOML and environment configuration |
//! | [`constants`] | Centralized configuration constants |
//! | [`bootstrap`] | Wiring of all services from one configuration |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`health`] | Bounded-latency store health probe |
//! | [`metrics`] | Operation latency timers and connection status gauge |
//! | [`logging`] | Structured logging with tracing |

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod connection;
pub mod constants;
pub mod error_ext;
pub mod health;
pub mod lock;
pub mod logging;
pub mod metrics;
pub mod resilience;
pub mod utils;

// Re-export commonly used types
pub use bootstrap::CoordinationContext;
pub use cache::CacheRepository;
pub use config::{ConfigLoader, StoreConfig};
pub use connection::{ConnectionProvider, Subscription};
pub use error_ext::ErrorContext;
pub use health::{HealthChecker, HealthIndicator};
pub use lock::LockService;
pub use metrics::{MetricsService, MonitorHandle, StoreMetrics};
pub use resilience::{CircuitBreaker, CircuitGuard, CircuitState, NoopGuard};
pub use utils::TimedOperation;
