//! Key-Value Store Port
//!
//! The primitives every backend exposes: plain values with TTL, lease
//! primitives for distributed locking, and publish/subscribe.
//!
//! ## Lease primitives
//!
//! A lease is a key holding an owner token with an expiry. Acquisition only
//! succeeds when the key is absent (`SET NX PX` on Redis). Release deletes the
//! key only while it still holds the caller's token, so a holder whose lease
//! expired can never delete a lease taken over by someone else.

use crate::error::Result;
use crate::value_objects::ChannelMessage;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

/// Unbounded stream of messages published on a channel.
///
/// The stream never terminates on its own; dropping it tears down the
/// underlying subscription.
pub type ChannelStream = Pin<Box<dyn Stream<Item = ChannelMessage> + Send>>;

/// Key-value store port
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
///
/// store.set("session:42", "{\"user\":7}", Some(Duration::from_secs(60))).await?;
/// if let Some(json) = store.get("session:42").await? {
///     println!("{json}");
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Round-trip a PING to the store
    async fn ping(&self) -> Result<()>;

    /// Get a string value; `None` when absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a string value, optionally expiring after `ttl`
    ///
    /// `None` stores the value without expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Delete a key
    ///
    /// # Returns
    /// True if the key existed and was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check whether a live key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Set a new expiry on an existing key
    ///
    /// # Returns
    /// False if the key does not exist
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Remaining time to live
    ///
    /// # Returns
    /// `None` when the key is missing or has no expiry
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Atomically create a lease key holding `token` if the key is absent
    async fn try_acquire_lease(&self, key: &str, token: &str, lease: Duration) -> Result<bool>;

    /// Atomically delete the lease key if it still holds `token`
    async fn release_lease(&self, key: &str, token: &str) -> Result<bool>;

    /// Token of the current lease holder, if any
    async fn lease_holder(&self, key: &str) -> Result<Option<String>>;

    /// Publish a message on a channel
    ///
    /// # Returns
    /// Number of subscribers that received the message
    async fn publish(&self, channel: &str, message: &str) -> Result<u64>;

    /// Subscribe to a channel
    async fn subscribe(&self, channel: &str) -> Result<ChannelStream>;

    /// Identifier of this backend (e.g. "redis", "memory")
    fn backend_name(&self) -> &str;
}
