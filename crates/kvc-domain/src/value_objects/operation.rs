//! Store operation identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Store primitive being executed, used for errors, logs and metric labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreOperation {
    Ping,
    Get,
    Set,
    Delete,
    Exists,
    Expire,
    Ttl,
    AcquireLease,
    ReleaseLease,
    LeaseHolder,
    Publish,
    Subscribe,
    Connect,
}

impl StoreOperation {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Get => "get",
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Exists => "exists",
            Self::Expire => "expire",
            Self::Ttl => "ttl",
            Self::AcquireLease => "acquire_lease",
            Self::ReleaseLease => "release_lease",
            Self::LeaseHolder => "lease_holder",
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
            Self::Connect => "connect",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
