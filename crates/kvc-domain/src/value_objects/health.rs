//! Health snapshot
//!
//! Created fresh by every probe and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health status of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    /// The store answered the probe in time
    Up,
    /// The store failed or did not answer in time
    Down,
}

impl HealthStatus {
    /// Check if the status indicates the store is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Gauge value (1 up, 0 down)
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Up => 1.0,
            Self::Down => 0.0,
        }
    }
}

/// Result of a single health probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Probe status
    pub status: HealthStatus,
    /// Round-trip latency in milliseconds, present when up
    pub latency_ms: Option<u64>,
    /// Error class, present when down
    pub error_kind: Option<String>,
    /// Human readable detail
    pub message: String,
    /// Backend that was probed
    pub backend: String,
    /// How the status was obtained
    pub source: String,
    /// When the probe completed
    pub timestamp: DateTime<Utc>,
}

impl HealthSnapshot {
    /// Snapshot for a successful probe
    pub fn up<S: Into<String>>(backend: S, latency: Duration) -> Self {
        Self {
            status: HealthStatus::Up,
            latency_ms: Some(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)),
            error_kind: None,
            message: "store connection is healthy".to_string(),
            backend: backend.into(),
            source: "active_ping".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Snapshot for a failed probe
    pub fn down<B, S, K, M>(backend: B, source: S, error_kind: K, message: M) -> Self
    where
        B: Into<String>,
        S: Into<String>,
        K: Into<String>,
        M: Into<String>,
    {
        Self {
            status: HealthStatus::Down,
            latency_ms: None,
            error_kind: Some(error_kind.into()),
            message: message.into(),
            backend: backend.into(),
            source: source.into(),
            timestamp: Utc::now(),
        }
    }

    /// Check if the probe succeeded
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}
