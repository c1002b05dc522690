//! # Store Providers
//!
//! Implementations of [`kvc_domain::KeyValueStore`].
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`RedisStore`] | Distributed | Redis over a multiplexed async connection |
//! | [`InMemoryStore`] | Local | Process-local store for development and tests |

pub mod store;

#[cfg(feature = "store-memory")]
pub use store::InMemoryStore;
#[cfg(feature = "store-redis")]
pub use store::RedisStore;
