//! Store Provider Implementations
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: `InMemoryStore`, with outage and latency
//!   injection for failure-path tests
//! - **Multi Instance**: `RedisStore`; locks are only mutually exclusive
//!   across processes when they share one store

#[cfg(feature = "store-memory")]
pub mod memory;
#[cfg(feature = "store-redis")]
pub mod redis;

#[cfg(feature = "store-memory")]
pub use memory::InMemoryStore;
#[cfg(feature = "store-redis")]
pub use redis::RedisStore;
