//! Deterministic key composition

use kvc_domain::constants::KEY_SEPARATOR;
use sha2::{Digest, Sha256};

/// `prefix:identifier`
pub fn generate_key(prefix: &str, identifier: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{identifier}")
}

/// `prefix:sha256-hex(content)`
///
/// Identical content always maps to the same key, whoever computes it.
pub fn content_key<C: AsRef<[u8]>>(prefix: &str, content: C) -> String {
    let digest = Sha256::digest(content.as_ref());
    generate_key(prefix, &hex::encode(digest))
}
