//! Connection provider
//!
//! Owns the shared store handle. Every call made by the lock service, the
//! cache repository, the health indicator and the metrics service goes
//! through [`ConnectionProvider`], which bounds concurrency and latency.

pub mod provider;
pub mod subscription;

pub use provider::ConnectionProvider;
pub use subscription::Subscription;
