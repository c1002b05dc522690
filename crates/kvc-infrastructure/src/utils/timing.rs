//! Latency measurement for store calls

use std::time::{Duration, Instant};

/// Wall-clock timer started when a store call begins
///
/// Feeds the latency reported by health snapshots and the operation
/// duration histogram.
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start timing now
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time since [`start`](Self::start)
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Whole milliseconds of a duration, saturating at `u64::MAX`
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
