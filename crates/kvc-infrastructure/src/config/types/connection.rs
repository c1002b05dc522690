//! Connection and pool configuration types

use crate::constants::*;
use kvc_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Store connection configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Store host
    pub host: String,

    /// Store port
    pub port: u16,

    /// ACL username
    pub username: Option<String>,

    /// Password (never logged)
    pub password: Option<String>,

    /// Logical database index
    pub database: u32,

    /// Connect timeout in milliseconds; also bounds availability pings
    pub connect_timeout_ms: u64,

    /// Per-command timeout in milliseconds
    pub command_timeout_ms: u64,

    /// Timeout for opening a channel subscription in milliseconds
    pub subscribe_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_STORE_HOST.to_string(),
            port: DEFAULT_STORE_PORT,
            username: None,
            password: None,
            database: 0,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            command_timeout_ms: COMMAND_TIMEOUT_MS,
            subscribe_timeout_ms: SUBSCRIBE_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    /// Connect timeout as a Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Command timeout as a Duration
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Subscribe timeout as a Duration
    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_ms)
    }

    /// Build the `redis://` connection URL, percent-encoding credentials
    pub fn redis_url(&self) -> Result<String> {
        let invalid = |what: &str| {
            Error::configuration(format!("Invalid Redis {what} for host '{}'", self.host))
        };

        let mut url = Url::parse("redis://localhost")
            .map_err(|e| Error::configuration_with_source("Invalid Redis URL", e))?;
        url.set_host(Some(&self.host))
            .map_err(|e| Error::configuration_with_source(format!("Invalid Redis host '{}'", self.host), e))?;
        url.set_port(Some(self.port)).map_err(|()| invalid("port"))?;
        if let Some(username) = self.username.as_deref() {
            url.set_username(username).map_err(|()| invalid("username"))?;
        }
        if let Some(password) = self.password.as_deref() {
            url.set_password(Some(password)).map_err(|()| invalid("password"))?;
        }
        url.set_path(&format!("/{}", self.database));

        Ok(url.into())
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("command_timeout_ms", &self.command_timeout_ms)
            .field("subscribe_timeout_ms", &self.subscribe_timeout_ms)
            .finish()
    }
}

/// Connection pool configuration
///
/// `max_active` bounds concurrent in-flight store calls. Callers wait up to
/// `max_wait_ms` for a free slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Whether concurrent calls are bounded at all
    pub enabled: bool,

    /// Maximum concurrent store calls
    pub max_active: usize,

    /// Maximum idle connections
    pub max_idle: usize,

    /// Minimum idle connections; non-zero warms the connection up at startup
    pub min_idle: usize,

    /// Maximum wait for a free slot in milliseconds
    pub max_wait_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_active: POOL_MAX_ACTIVE,
            max_idle: POOL_MAX_IDLE,
            min_idle: POOL_MIN_IDLE,
            max_wait_ms: POOL_MAX_WAIT_MS,
        }
    }
}

impl PoolConfig {
    /// Slot wait as a Duration
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}
