//! Cache repository
//!
//! Typed JSON values with optional TTL. Entries past their TTL are absent,
//! never stale-but-present.

pub mod keys;
pub mod repository;

pub use keys::{content_key, generate_key};
pub use repository::CacheRepository;
