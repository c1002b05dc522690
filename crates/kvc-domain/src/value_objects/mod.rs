//! Value Objects
//!
//! Immutable types exchanged between the coordination services and their
//! callers.

pub mod channel;
pub mod health;
pub mod lock;
pub mod operation;

pub use channel::ChannelMessage;
pub use health::{HealthSnapshot, HealthStatus};
pub use lock::{CriticalSection, LockOutcome};
pub use operation::StoreOperation;
