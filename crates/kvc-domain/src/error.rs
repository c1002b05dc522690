//! Error handling types

use crate::value_objects::StoreOperation;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by infrastructure variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the coordination layer
#[derive(Error, Debug)]
pub enum Error {
    /// Caller misuse detected before any network access
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// The store could not be reached (refused, dropped, DNS, I/O)
    #[error("Connection error during {operation}: {message}")]
    Connection {
        /// Store operation that failed
        operation: StoreOperation,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// The store answered with an error
    #[error("Store error during {operation}: {message}")]
    Store {
        /// Store operation that failed
        operation: StoreOperation,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// A store call exceeded its deadline
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout {
        /// Store operation that timed out
        operation: StoreOperation,
        /// Deadline that elapsed in milliseconds
        after_ms: u64,
    },

    /// The circuit breaker rejected the call without contacting the store
    #[error("Circuit breaker '{name}' is open")]
    CircuitOpen {
        /// Name of the breaker
        name: String,
    },

    /// No connection slot became free in time
    #[error("No store connection slot available after {waited_ms}ms")]
    PoolExhausted {
        /// Time spent waiting in milliseconds
        waited_ms: u64,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: StoreOperation, after: std::time::Duration) -> Self {
        Self::Timeout {
            operation,
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a circuit-open error
    pub fn circuit_open<S: Into<String>>(name: S) -> Self {
        Self::CircuitOpen { name: name.into() }
    }
}

// Store error creation methods
impl Error {
    /// Create a store error
    pub fn store<S: Into<String>>(operation: StoreOperation, message: S) -> Self {
        Self::Store {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source
    pub fn store_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        operation: StoreOperation,
        message: S,
        source: E,
    ) -> Self {
        Self::Store {
            operation,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a connection error
    pub fn connection<S: Into<String>>(operation: StoreOperation, message: S) -> Self {
        Self::Connection {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        operation: StoreOperation,
        message: S,
        source: E,
    ) -> Self {
        Self::Connection {
            operation,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification
impl Error {
    /// Whether retrying the same call later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Timeout { .. } | Self::PoolExhausted { .. }
        )
    }

    /// Whether this error is caller misuse
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Short, stable class name used in logs and health details
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::Connection { .. } => "ConnectionError",
            Self::Store { .. } => "StoreError",
            Self::Timeout { .. } => "Timeout",
            Self::CircuitOpen { .. } => "CircuitOpen",
            Self::PoolExhausted { .. } => "PoolExhausted",
            Self::Json { .. } => "JsonError",
            Self::Configuration { .. } => "ConfigurationError",
            Self::Internal { .. } => "InternalError",
        }
    }
}

/// Reject empty or whitespace-only keys before any network access
pub fn validate_key(label: &str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{label} must not be empty")));
    }
    Ok(())
}
