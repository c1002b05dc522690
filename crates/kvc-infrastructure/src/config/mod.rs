//! Configuration management
//!
//! One immutable [`StoreConfig`] is loaded at startup and shared by
//! reference (`Arc<StoreConfig>`) with every component.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
