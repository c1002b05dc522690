//! Redis store provider
//!
//! Store implementation using Redis as the backend. Suitable for
//! multi-instance deployments; this is the backend that makes locks
//! mutually exclusive across processes.
//!
//! ## Features
//!
//! - One shared multiplexed connection, re-established after connectivity
//!   failures
//! - Millisecond TTLs (`SET … PX`, `PEXPIRE`, `PTTL`)
//! - Lease release through a compare-and-delete Lua script
//! - Pub/sub on a dedicated connection per subscription
//!
//! ## Example
//!
//! ```ignore
//! use kvc_providers::store::RedisStore;
//!
//! let store = RedisStore::new("redis://localhost:6379/0")?;
//! // Or with host/port
//! let store = RedisStore::with_host_port("localhost", 6379)?;
//! ```

use async_trait::async_trait;
use futures::StreamExt;
use kvc_domain::error::{Error, Result};
use kvc_domain::ports::{ChannelStream, KeyValueStore};
use kvc_domain::value_objects::{ChannelMessage, StoreOperation};
use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client, RedisError, RedisResult, Script};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Deletes the lease key only while it still holds the caller's token
const RELEASE_LEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Default connect timeout when none is configured
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Redis store provider
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    address: String,
    connect_timeout: Duration,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    release_script: Arc<Script>,
}

impl RedisStore {
    /// Create a new Redis store with connection URL
    ///
    /// No connection is opened until the first command.
    ///
    /// # Arguments
    ///
    /// * `connection_url` - Redis connection URL (e.g., "redis://localhost:6379/0")
    pub fn new(connection_url: &str) -> Result<Self> {
        let client = Client::open(connection_url).map_err(|e| {
            Error::configuration_with_source(format!("Invalid Redis URL: {e}"), e)
        })?;

        Ok(Self {
            client,
            address: redact(connection_url),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            connection: Arc::new(RwLock::new(None)),
            release_script: Arc::new(Script::new(RELEASE_LEASE_SCRIPT)),
        })
    }

    /// Create a new Redis store with host and port
    pub fn with_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"))
    }

    /// Bound the time spent establishing a connection
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Server address without credentials
    pub fn server_address(&self) -> &str {
        &self.address
    }

    /// Get the shared connection, connecting on first use
    async fn connection(&self) -> Result<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut slot = self.connection.write().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        debug!(address = %self.address, "Opening Redis connection");
        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| Error::timeout(StoreOperation::Connect, self.connect_timeout))?
        .map_err(|e| map_redis_error(StoreOperation::Connect, e))?;

        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Drop the shared connection so the next command reconnects
    async fn invalidate(&self) {
        if self.connection.write().await.take().is_some() {
            warn!(address = %self.address, "Redis connection dropped, will reconnect");
        }
    }

    /// Run a command on the shared connection, mapping errors
    async fn run<T, F, Fut>(&self, operation: StoreOperation, command: F) -> Result<T>
    where
        F: FnOnce(MultiplexedConnection) -> Fut + Send,
        Fut: Future<Output = RedisResult<T>> + Send,
        T: Send,
    {
        let conn = self.connection().await?;
        match command(conn).await {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = map_redis_error(operation, e);
                if err.is_transient() {
                    self.invalidate().await;
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> Result<()> {
        self.run(StoreOperation::Ping, |mut conn| async move {
            ::redis::cmd("PING").query_async::<String>(&mut conn).await
        })
        .await
        .and_then(|pong| {
            if pong.eq_ignore_ascii_case("PONG") {
                Ok(())
            } else {
                Err(Error::store(
                    StoreOperation::Ping,
                    format!("Unexpected PING reply: {pong}"),
                ))
            }
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run(StoreOperation::Get, |mut conn| async move {
            conn.get::<_, Option<String>>(key).await
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.run(StoreOperation::Set, |mut conn| async move {
            let mut cmd = ::redis::cmd("SET");
            cmd.arg(key).arg(value);
            if let Some(ttl) = ttl {
                cmd.arg("PX").arg(millis(ttl).max(1));
            }
            cmd.query_async::<()>(&mut conn).await
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.run(StoreOperation::Delete, |mut conn| async move {
            conn.del::<_, i64>(key).await
        })
        .await
        .map(|count| count > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.run(StoreOperation::Exists, |mut conn| async move {
            conn.exists::<_, i64>(key).await
        })
        .await
        .map(|count| count > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.run(StoreOperation::Expire, |mut conn| async move {
            ::redis::cmd("PEXPIRE")
                .arg(key)
                .arg(millis(ttl).max(1))
                .query_async::<i64>(&mut conn)
                .await
        })
        .await
        .map(|updated| updated == 1)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        // PTTL: -2 missing key, -1 no expiry
        self.run(StoreOperation::Ttl, |mut conn| async move {
            ::redis::cmd("PTTL").arg(key).query_async::<i64>(&mut conn).await
        })
        .await
        .map(|ms| u64::try_from(ms).ok().map(Duration::from_millis))
    }

    async fn try_acquire_lease(&self, key: &str, token: &str, lease: Duration) -> Result<bool> {
        self.run(StoreOperation::AcquireLease, |mut conn| async move {
            ::redis::cmd("SET")
                .arg(key)
                .arg(token)
                .arg("NX")
                .arg("PX")
                .arg(millis(lease).max(1))
                .query_async::<Option<String>>(&mut conn)
                .await
        })
        .await
        .map(|reply| reply.is_some())
    }

    async fn release_lease(&self, key: &str, token: &str) -> Result<bool> {
        let script = Arc::clone(&self.release_script);
        self.run(StoreOperation::ReleaseLease, |mut conn| async move {
            script
                .key(key)
                .arg(token)
                .invoke_async::<i64>(&mut conn)
                .await
        })
        .await
        .map(|deleted| deleted == 1)
    }

    async fn lease_holder(&self, key: &str) -> Result<Option<String>> {
        self.run(StoreOperation::LeaseHolder, |mut conn| async move {
            conn.get::<_, Option<String>>(key).await
        })
        .await
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<u64> {
        self.run(StoreOperation::Publish, |mut conn| async move {
            ::redis::cmd("PUBLISH")
                .arg(channel)
                .arg(message)
                .query_async::<u64>(&mut conn)
                .await
        })
        .await
    }

    async fn subscribe(&self, channel: &str) -> Result<ChannelStream> {
        let mut pubsub = tokio::time::timeout(self.connect_timeout, self.client.get_async_pubsub())
            .await
            .map_err(|_| Error::timeout(StoreOperation::Subscribe, self.connect_timeout))?
            .map_err(|e| map_redis_error(StoreOperation::Subscribe, e))?;

        pubsub
            .subscribe(channel)
            .await
            .map_err(|e| map_redis_error(StoreOperation::Subscribe, e))?;
        debug!(channel, "Subscribed to Redis channel");

        let stream = pubsub.into_on_message().filter_map(|msg| {
            let decoded = match msg.get_payload::<String>() {
                Ok(payload) => Some(ChannelMessage::new(msg.get_channel_name(), payload)),
                Err(e) => {
                    warn!(channel = msg.get_channel_name(), error = %e, "Dropping undecodable message");
                    None
                }
            };
            futures::future::ready(decoded)
        });

        Ok(Box::pin(stream))
    }

    fn backend_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("server", &self.address)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

/// Classify a Redis error as a connectivity or an operational failure
fn map_redis_error(operation: StoreOperation, err: RedisError) -> Error {
    let message = err.to_string();
    if err.is_timeout()
        || err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        Error::connection_with_source(operation, message, err)
    } else {
        Error::store_with_source(operation, message, err)
    }
}

/// Whole milliseconds; callers clamp to 1 where Redis rejects or
/// misreads a zero expiry
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Strip credentials from a connection URL for logs
fn redact(connection_url: &str) -> String {
    match (connection_url.find("://"), connection_url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://{}", &connection_url[..scheme_end], &connection_url[at + 1..])
        }
        _ => connection_url.to_string(),
    }
}
