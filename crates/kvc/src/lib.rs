//! # kvc
//!
//! Coordination primitives on a shared Redis store: distributed locks
//! guarded by a circuit breaker, a typed TTL cache, a bounded-latency
//! health probe and connection metrics.
//!
//! ## Example
//!
//! ```ignore
//! use kvc::infrastructure::{ConfigLoader, CoordinationContext};
//! use std::time::Duration;
//!
//! let config = ConfigLoader::new().load()?;
//! let context = CoordinationContext::connect(config).await?;
//!
//! let outcome = context
//!     .locks()
//!     .execute_with_lock("job-42", Duration::from_secs(2), Duration::from_secs(5), || async {
//!         Ok::<_, kvc::Error>(run_job().await)
//!     })
//!     .await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Error taxonomy, store port, value objects
//! - `providers` - Redis and in-memory store backends
//! - `infrastructure` - Connection provider, locks, cache, health, metrics, config
//! - `cli` - The `kvc` command line tool

pub mod cli;

/// Domain layer - core types and the store port
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use kvc_domain::*;
}

/// Store backends
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use kvc_providers::*;
}

/// Infrastructure layer - coordination services, config and observability
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use kvc_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the service entry point
pub use infrastructure::CoordinationContext;
