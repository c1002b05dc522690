//! Infrastructure layer constants
//!
//! Deployment defaults for the coordination services. Behavioural defaults
//! shared with callers are defined in `kvc_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "kvc.toml";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "KVC";

/// Separator for nested keys in environment variables (`KVC__POOL__MAX_ACTIVE`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "KVC_LOG";

// ============================================================================
// CONNECTION CONSTANTS
// ============================================================================

/// Default store host
pub const DEFAULT_STORE_HOST: &str = "localhost";

/// Default Redis port
pub const DEFAULT_STORE_PORT: u16 = 6379;

/// Connect timeout in milliseconds
pub const CONNECT_TIMEOUT_MS: u64 = 3000;

/// Per-command timeout in milliseconds
pub const COMMAND_TIMEOUT_MS: u64 = 5000;

/// Timeout for opening a channel subscription in milliseconds
pub const SUBSCRIBE_TIMEOUT_MS: u64 = 2000;

// ============================================================================
// POOL CONSTANTS
// ============================================================================

/// Maximum concurrent store calls
pub const POOL_MAX_ACTIVE: usize = 8;

/// Maximum idle connections
pub const POOL_MAX_IDLE: usize = 8;

/// Minimum idle connections
pub const POOL_MIN_IDLE: usize = 0;

/// Maximum wait for a free slot in milliseconds
pub const POOL_MAX_WAIT_MS: u64 = 1000;

// ============================================================================
// RESILIENCE CONSTANTS
// ============================================================================

/// Name of the breaker guarding lock calls
pub const CIRCUIT_BREAKER_NAME: &str = "redisLock";

/// Failure rate (percent) that opens the circuit
pub const CIRCUIT_BREAKER_FAILURE_RATE: f64 = 50.0;

/// Number of recent calls in the rolling window
pub const CIRCUIT_BREAKER_WINDOW_SIZE: usize = 10;

/// Calls required before the failure rate is evaluated
pub const CIRCUIT_BREAKER_MINIMUM_CALLS: usize = 10;

/// Time the circuit stays open in milliseconds
pub const CIRCUIT_BREAKER_OPEN_WAIT_MS: u64 = 10_000;

/// Trial calls admitted while half-open
pub const CIRCUIT_BREAKER_HALF_OPEN_CALLS: u32 = 3;

/// Retry attempts including the first call
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// First retry delay in milliseconds
pub const RETRY_BACKOFF_MS: u64 = 1000;

/// Upper bound for a single retry delay in milliseconds
pub const RETRY_MAX_BACKOFF_MS: u64 = 30_000;

// ============================================================================
// LOCK CONSTANTS
// ============================================================================

/// Pause between acquisition attempts in milliseconds
pub const LOCK_RETRY_INTERVAL_MS: u64 = 50;

// ============================================================================
// OBSERVABILITY CONSTANTS
// ============================================================================

/// Connection status polling interval in seconds
pub const METRICS_POLL_INTERVAL_SECS: u64 = 30;

/// Operation latency histogram
pub const METRIC_OPERATION_DURATION: &str = "kvc_store_operation_duration_seconds";

/// Connection status gauge (1 up, 0 down)
pub const METRIC_CONNECTION_STATUS: &str = "kvc_store_connection_status";

/// Circuit breaker state gauge (0 closed, 0.5 half-open, 1 open)
pub const METRIC_BREAKER_STATE: &str = "kvc_circuit_breaker_state";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
