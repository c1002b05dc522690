//! Configuration types module

pub mod app;
pub mod cache;
pub mod connection;
pub mod lock;
pub mod logging;
pub mod observability;
pub mod resilience;

// Re-export main types
pub use app::StoreConfig;
pub use cache::CacheConfig;
pub use connection::{ConnectionConfig, PoolConfig};
pub use lock::LockConfig;
pub use logging::LoggingConfig;
pub use observability::{HealthConfig, MetricsConfig};
pub use resilience::{CircuitBreakerConfig, RetryConfig};
