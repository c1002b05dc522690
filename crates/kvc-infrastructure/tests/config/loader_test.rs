//! Configuration Loader Tests

use kvc_infrastructure::config::{ConfigLoader, StoreConfig};
use kvc_infrastructure::constants::{DEFAULT_LOG_LEVEL, DEFAULT_STORE_PORT};
use tempfile::TempDir;

#[test]
fn test_config_loader_default() {
    let config = ConfigLoader::new().load().unwrap();

    assert_eq!(config.connection.port, DEFAULT_STORE_PORT);
    assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
}

#[test]
fn test_config_loader_reads_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kvc.toml");
    std::fs::write(
        &config_path,
        r#"
[connection]
host = "cache.internal"
port = 6380
database = 3

[lock]
default_wait_ms = 250

[cache]
key_prefix = "orders"
default_ttl_secs = 60
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().with_config_path(&config_path).load().unwrap();

    assert_eq!(config.connection.host, "cache.internal");
    assert_eq!(config.connection.port, 6380);
    assert_eq!(config.connection.database, 3);
    assert_eq!(config.lock.default_wait_ms, 250);
    // Untouched fields keep their defaults
    assert_eq!(config.lock.default_lease_ms, 5000);
    assert_eq!(config.cache.key_prefix.as_deref(), Some("orders"));
    assert_eq!(config.cache.default_ttl(), Some(std::time::Duration::from_secs(60)));
}

#[test]
fn test_config_loader_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new().with_config_path(temp_dir.path().join("absent.toml"));

    let config = loader.load().unwrap();
    assert_eq!(config.connection.host, "localhost");
}

#[test]
fn test_config_loader_rejects_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kvc.toml");
    std::fs::write(&config_path, "[circuit_breaker]\nfailure_rate_threshold = 150.0\n").unwrap();

    let err = ConfigLoader::new()
        .with_config_path(&config_path)
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), "ConfigurationError");
}

#[test]
fn test_config_loader_rejects_malformed_value() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("kvc.toml");
    std::fs::write(&config_path, "[connection]\nport = \"not-a-port\"\n").unwrap();

    let result = ConfigLoader::new().with_config_path(&config_path).load();
    assert!(result.is_err());
}

#[test]
fn test_config_save_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("saved.toml");

    let mut config = StoreConfig::default();
    config.connection.port = 7000;
    config.circuit_breaker.name = "billingLock".to_string();

    let loader = ConfigLoader::new();
    loader.save_to_file(&config, &config_path).unwrap();

    let loaded = ConfigLoader::new().with_config_path(&config_path).load().unwrap();
    assert_eq!(loaded.connection.port, 7000);
    assert_eq!(loaded.circuit_breaker.name, "billingLock");
}
