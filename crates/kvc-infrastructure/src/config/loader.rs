//! Configuration loader
//!
//! Merges, later sources overriding earlier ones:
//! 1. Defaults from `StoreConfig::default()`
//! 2. A TOML file (explicit path, or `kvc.toml` in the working directory)
//! 3. Environment variables prefixed `KVC__`, nested with `__`
//!    (`KVC__CONNECTION__HOST`, `KVC__POOL__MAX_ACTIVE`)
//!
//! The merged configuration is validated before it is returned.

use crate::config::StoreConfig;
use crate::constants::*;
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use kvc_domain::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Get the configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load configuration from all sources
    pub fn load(&self) -> Result<StoreConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(StoreConfig::default()));

        let path = self
            .config_path
            .clone()
            .or_else(|| std::env::current_dir().ok().map(|d| d.join(DEFAULT_CONFIG_FILENAME)));
        if let Some(path) = path {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                log_config_loaded(&path, true);
            } else if self.config_path.is_some() {
                log_config_loaded(&path, false);
            }
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}{CONFIG_ENV_SEPARATOR}", self.env_prefix))
                .split(CONFIG_ENV_SEPARATOR),
        );

        let config: StoreConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &StoreConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

        Ok(())
    }
}

/// Validate every configuration section
pub fn validate_config(config: &StoreConfig) -> Result<()> {
    validate_connection_config(config)?;
    validate_pool_config(config)?;
    validate_circuit_breaker_config(config)?;
    validate_retry_config(config)?;
    validate_lock_config(config)?;
    validate_observability_config(config)?;
    crate::logging::parse_log_level(&config.logging.level)?;
    Ok(())
}

fn validate_connection_config(config: &StoreConfig) -> Result<()> {
    let connection = &config.connection;
    if connection.host.trim().is_empty() {
        return Err(Error::configuration("Store host cannot be empty"));
    }
    if connection.port == 0 {
        return Err(Error::configuration("Store port cannot be 0"));
    }
    if connection.connect_timeout_ms == 0 {
        return Err(Error::configuration("Connect timeout cannot be 0"));
    }
    if connection.command_timeout_ms == 0 {
        return Err(Error::configuration("Command timeout cannot be 0"));
    }
    if connection.subscribe_timeout_ms == 0 {
        return Err(Error::configuration("Subscribe timeout cannot be 0"));
    }
    Ok(())
}

fn validate_pool_config(config: &StoreConfig) -> Result<()> {
    let pool = &config.pool;
    if !pool.enabled {
        return Ok(());
    }
    if pool.max_active == 0 {
        return Err(Error::configuration(
            "Pool max_active cannot be 0 when the pool is enabled",
        ));
    }
    if pool.min_idle > pool.max_idle {
        return Err(Error::configuration(format!(
            "Pool min_idle ({}) cannot exceed max_idle ({})",
            pool.min_idle, pool.max_idle
        )));
    }
    Ok(())
}

fn validate_circuit_breaker_config(config: &StoreConfig) -> Result<()> {
    let breaker = &config.circuit_breaker;
    if !breaker.enabled {
        return Ok(());
    }
    if !(breaker.failure_rate_threshold > 0.0 && breaker.failure_rate_threshold <= 100.0) {
        return Err(Error::configuration(format!(
            "Circuit breaker failure rate threshold must be in (0, 100], got {}",
            breaker.failure_rate_threshold
        )));
    }
    if breaker.sliding_window_size == 0 {
        return Err(Error::configuration(
            "Circuit breaker sliding window size cannot be 0",
        ));
    }
    if breaker.permitted_calls_half_open == 0 {
        return Err(Error::configuration(
            "Circuit breaker half-open trial budget cannot be 0",
        ));
    }
    Ok(())
}

fn validate_retry_config(config: &StoreConfig) -> Result<()> {
    if config.retry.enabled && config.retry.max_attempts == 0 {
        return Err(Error::configuration(
            "Retry max_attempts cannot be 0 when retry is enabled",
        ));
    }
    Ok(())
}

fn validate_lock_config(config: &StoreConfig) -> Result<()> {
    if config.lock.retry_interval_ms == 0 {
        return Err(Error::configuration("Lock retry interval cannot be 0"));
    }
    Ok(())
}

fn validate_observability_config(config: &StoreConfig) -> Result<()> {
    if config.health.timeout_ms == 0 {
        return Err(Error::configuration("Health timeout cannot be 0"));
    }
    if config.metrics.enabled && config.metrics.poll_interval_secs == 0 {
        return Err(Error::configuration(
            "Metrics poll interval cannot be 0 when metrics are enabled",
        ));
    }
    Ok(())
}
