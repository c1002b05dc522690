//! Environment override tests
//!
//! These tests modify environment variables and must run sequentially:
//!
//! ```bash
//! cargo test -p kvc-infrastructure --test unit config_env -- --test-threads=1 --ignored
//! ```
//!
//! # Safety
//!
//! Rust 2024 requires `unsafe` for `env::set_var`/`env::remove_var`.
//! Tests MUST run with `--test-threads=1` to prevent data races.

use kvc_infrastructure::config::ConfigLoader;
use std::env;

fn set_env(key: &str, value: &str) {
    // SAFETY: Tests must run with --test-threads=1
    unsafe {
        env::set_var(key, value);
    }
}

fn remove_env(key: &str) {
    // SAFETY: Tests must run with --test-threads=1
    unsafe {
        env::remove_var(key);
    }
}

#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_kvc_prefix_env_vars_loaded() {
    set_env("KVC__CONNECTION__HOST", "redis.internal");
    set_env("KVC__POOL__MAX_ACTIVE", "32");

    let config = ConfigLoader::new().load().expect("Should load config");

    assert_eq!(config.connection.host, "redis.internal");
    assert_eq!(config.pool.max_active, 32);

    remove_env("KVC__CONNECTION__HOST");
    remove_env("KVC__POOL__MAX_ACTIVE");
}

#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_env_overrides_file() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("kvc.toml");
    std::fs::write(&path, "[lock]\ndefault_wait_ms = 100\n").unwrap();
    set_env("KVC__LOCK__DEFAULT_WAIT_MS", "750");

    let config = ConfigLoader::new().with_config_path(&path).load().unwrap();
    assert_eq!(config.lock.default_wait_ms, 750);

    remove_env("KVC__LOCK__DEFAULT_WAIT_MS");
}

#[test]
#[ignore = "requires --test-threads=1 due to env var mutations"]
fn test_invalid_env_value_fails_validation() {
    set_env("KVC__CONNECTION__PORT", "0");

    let result = ConfigLoader::new().load();
    assert!(result.is_err());

    remove_env("KVC__CONNECTION__PORT");
}
