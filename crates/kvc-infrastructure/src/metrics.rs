//! Store metrics
//!
//! Operation latency is recorded in the `kvc_store_operation_duration_seconds`
//! histogram, labelled by operation. Connection status is published as the
//! `kvc_store_connection_status` gauge (1 up, 0 down) and mirrored in an
//! atomic so callers can read it without a metrics recorder installed.
//!
//! [`MetricsService`] re-probes the store on a fixed interval until its
//! [`MonitorHandle`] is shut down.

use crate::config::MetricsConfig;
use crate::connection::ConnectionProvider;
use crate::constants::{METRIC_CONNECTION_STATUS, METRIC_OPERATION_DURATION};
use crate::utils::{TimedOperation, millis};
use kvc_domain::error::Result;
use kvc_domain::value_objects::StoreOperation;
use metrics::{counter, gauge, histogram};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Latency timers and the connection status gauge
#[derive(Debug, Clone, Default)]
pub struct StoreMetrics {
    connected: Arc<AtomicBool>,
    probes: Arc<AtomicU64>,
}

impl StoreMetrics {
    /// Create metrics with the connection reported down until the first probe
    pub fn new() -> Self {
        let metrics = Self::default();
        gauge!(METRIC_CONNECTION_STATUS).set(0.0);
        metrics
    }

    /// Record the latency of one operation
    pub fn record_operation(&self, operation: StoreOperation, elapsed: Duration, success: bool) {
        histogram!(METRIC_OPERATION_DURATION, "operation" => operation.as_str())
            .record(elapsed.as_secs_f64());
        if !success {
            counter!("kvc_store_operation_errors_total", "operation" => operation.as_str())
                .increment(1);
        }
    }

    /// Time `future` as `operation`
    pub async fn time<T, Fut>(&self, operation: StoreOperation, future: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let timer = TimedOperation::start();
        let result = future.await;
        self.record_operation(operation, timer.elapsed(), result.is_ok());
        result
    }

    /// Publish the connection status
    pub fn set_connection_status(&self, up: bool) {
        let previous = self.connected.swap(up, Ordering::SeqCst);
        self.probes.fetch_add(1, Ordering::SeqCst);
        gauge!(METRIC_CONNECTION_STATUS).set(if up { 1.0 } else { 0.0 });
        if previous != up {
            info!(connected = up, "Store connection status changed");
        }
    }

    /// Last published connection status
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Connection status as the gauge value
    pub fn connection_status(&self) -> u8 {
        u8::from(self.is_connected())
    }

    /// Number of status updates published so far
    pub fn probe_count(&self) -> u64 {
        self.probes.load(Ordering::SeqCst)
    }
}

/// Background connection status monitor
#[derive(Debug, Clone)]
pub struct MetricsService {
    provider: Arc<ConnectionProvider>,
    metrics: StoreMetrics,
    poll_interval: Duration,
}

impl MetricsService {
    /// Create a monitor polling every `config.poll_interval_secs`
    pub fn new(provider: Arc<ConnectionProvider>, metrics: StoreMetrics, config: &MetricsConfig) -> Self {
        Self::with_interval(provider, metrics, config.poll_interval())
    }

    /// Create a monitor with an explicit polling interval
    pub fn with_interval(
        provider: Arc<ConnectionProvider>,
        metrics: StoreMetrics,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            metrics,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Metrics updated by this monitor
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Probe once and update the gauge
    pub async fn refresh(&self) -> bool {
        let up = self.provider.is_available().await;
        self.metrics.set_connection_status(up);
        if !up {
            warn!(backend = self.provider.backend_name(), "Store connection probe failed");
        }
        up
    }

    /// Start polling on the current runtime
    ///
    /// The first probe runs immediately. A failed probe only sets the gauge
    /// to 0; the loop keeps running until [`MonitorHandle::shutdown`].
    pub fn spawn(self) -> MonitorHandle {
        let token = CancellationToken::new();
        let child = token.child_token();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = millis(self.poll_interval), "Connection monitor started");
            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            () = child.cancelled() => break,
                            up = self.refresh() => debug!(connected = up, "Connection probe completed"),
                        }
                    }
                }
            }
            info!("Connection monitor stopped");
        });
        MonitorHandle { token, task }
    }
}

/// Handle to a running connection monitor
#[derive(Debug)]
pub struct MonitorHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Whether the polling loop is still running
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the polling loop and wait for it to exit
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Connection monitor task ended abnormally");
        }
    }
}
