//! Cache configuration types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache repository configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace prepended to every cache key (`{prefix}:{key}`)
    pub key_prefix: Option<String>,

    /// TTL applied when a write does not specify one; `None` persists
    pub default_ttl_secs: Option<u64>,
}

impl CacheConfig {
    /// Default TTL as a Duration
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }
}
