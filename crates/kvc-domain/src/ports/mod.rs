//! Domain Port Interfaces
//!
//! Boundary contracts between the coordination services and the store
//! backends. High-level services depend on these traits; backends in
//! `kvc-providers` implement them.

/// Key-value store port
pub mod store;

pub use store::{ChannelStream, KeyValueStore};
