//! Lock results
//!
//! Contention and degradation are different answers. A caller that loses a
//! race for a lock should usually retry next round; a caller whose lock
//! service is degraded should skip the critical section and may alert.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of a lock acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockOutcome {
    /// The lock is now held by the calling context
    Acquired,
    /// Another holder kept the lock for the whole wait time
    Contended,
    /// The lock service could not be used (breaker open or store failure)
    Unavailable,
}

impl LockOutcome {
    /// Boolean view: true only when the lock was acquired
    pub fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired)
    }
}

impl fmt::Display for LockOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquired => write!(f, "acquired"),
            Self::Contended => write!(f, "contended"),
            Self::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Result of running an operation under a lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriticalSection<T> {
    /// The lock was acquired and the operation completed
    Completed(T),
    /// The lock was not acquired within the wait time
    Contended,
    /// The lock service was unavailable; the operation did not run
    Unavailable,
}

impl<T> CriticalSection<T> {
    /// Whether the operation ran
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// The operation's value, or `None` when it did not run
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Contended | Self::Unavailable => None,
        }
    }

    /// Map the completed value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> CriticalSection<U> {
        match self {
            Self::Completed(value) => CriticalSection::Completed(f(value)),
            Self::Contended => CriticalSection::Contended,
            Self::Unavailable => CriticalSection::Unavailable,
        }
    }
}
