//! # Domain Layer
//!
//! Core types shared by every layer of the key-value coordination stack.
//!
//! ## Module Categories
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`ports`] | Boundary contracts implemented by store backends |
//! | [`value_objects`] | Lock outcomes, health snapshots, channel messages |
//! | [`constants`] | Defaults shared across crates |
//!
//! The domain crate has no knowledge of Redis. Backends live in
//! `kvc-providers`; services built on top of the port live in
//! `kvc-infrastructure`.

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{ChannelStream, KeyValueStore};
pub use value_objects::{
    ChannelMessage, CriticalSection, HealthSnapshot, HealthStatus, LockOutcome, StoreOperation,
};
