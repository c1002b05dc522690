//! Domain constants
//!
//! Defaults that describe behaviour rather than deployment. Deployment
//! tunables live in `kvc_infrastructure::config`.

/// Default time a lock acquisition may wait, in milliseconds
pub const DEFAULT_LOCK_WAIT_MS: u64 = 2000;

/// Default lease duration of an acquired lock, in milliseconds
pub const DEFAULT_LOCK_LEASE_MS: u64 = 5000;

/// Separator used when composing cache and lock keys
pub const KEY_SEPARATOR: &str = ":";

/// Default health probe timeout, in milliseconds
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 2000;
