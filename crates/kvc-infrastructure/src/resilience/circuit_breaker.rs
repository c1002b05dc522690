//! Circuit Breaker Module
//!
//! Failure-rate circuit breaker. The state machine ([`BreakerCore`]) is
//! pure and takes the current instant as an argument, so it can be driven
//! in tests without any store or clock. [`CircuitBreaker`] is the
//! thread-safe handle wrapping it.
//!
//! Transitions:
//!
//! ```text
//! CLOSED ──failure rate ≥ threshold──▶ OPEN
//! OPEN ──wait duration elapsed──▶ HALF_OPEN
//! HALF_OPEN ──all trial calls succeed──▶ CLOSED
//! HALF_OPEN ──any trial call fails──▶ OPEN
//! ```

use crate::config::CircuitBreakerConfig;
use crate::constants::METRIC_BREAKER_STATE;
use kvc_domain::error::{Error, Result};
use metrics::{counter, gauge};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Calls pass through and outcomes are recorded
    Closed,
    /// Calls are rejected without reaching the store
    Open,
    /// A limited number of trial calls pass through
    HalfOpen,
}

impl CircuitState {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half-open",
        }
    }

    /// Gauge value (0 closed, 0.5 half-open, 1 open)
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Closed => 0.0,
            Self::HalfOpen => 0.5,
            Self::Open => 1.0,
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change performed by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State before the change
    pub from: CircuitState,
    /// State after the change
    pub to: CircuitState,
}

impl Transition {
    fn is_allowed(from: CircuitState, to: CircuitState) -> bool {
        matches!(
            (from, to),
            (CircuitState::Closed, CircuitState::Open)
                | (CircuitState::Open, CircuitState::HalfOpen)
                | (CircuitState::HalfOpen, CircuitState::Closed)
                | (CircuitState::HalfOpen, CircuitState::Open)
        )
    }
}

/// Admission decision for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Whether the call may proceed
    pub permitted: bool,
    /// Transition performed while deciding, if any
    pub transition: Option<Transition>,
    /// Ticket the call reports its outcome with
    pub ticket: CallTicket,
}

/// Identifies the state period a call was admitted in
///
/// Every transition starts a new generation. Outcomes carrying an older
/// generation are counted in the metrics but never move the state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTicket {
    generation: u64,
}

impl CallTicket {
    /// Generation the call was admitted in
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Circuit breaker metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakerMetrics {
    /// Calls that asked for admission
    pub total_calls: u64,
    /// Admitted calls that succeeded
    pub successful_calls: u64,
    /// Admitted calls that failed
    pub failed_calls: u64,
    /// Calls rejected without reaching the store
    pub rejected_calls: u64,
    /// Times the circuit went to OPEN
    pub times_opened: u64,
}

/// Count-based rolling window of call outcomes
#[derive(Debug, Clone)]
pub struct RollingWindow {
    outcomes: VecDeque<bool>,
    capacity: usize,
    failures: usize,
}

impl RollingWindow {
    /// Window keeping the last `capacity` outcomes
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            failures: 0,
        }
    }

    /// Record one outcome, evicting the oldest when full
    pub fn record(&mut self, failed: bool) {
        if self.outcomes.len() == self.capacity && self.outcomes.pop_front() == Some(true) {
            self.failures -= 1;
        }
        self.outcomes.push_back(failed);
        if failed {
            self.failures += 1;
        }
    }

    /// Recorded outcomes
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Window capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Failed outcomes in the window
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Failure rate in percent; 0 for an empty window
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.failures as f64 * 100.0 / self.outcomes.len() as f64
    }

    /// Forget every outcome
    pub fn clear(&mut self) {
        self.outcomes.clear();
        self.failures = 0;
    }
}

/// Pure circuit breaker state machine
#[derive(Debug, Clone)]
pub struct BreakerCore {
    failure_rate_threshold: f64,
    minimum_calls: usize,
    wait_duration_open: Duration,
    permitted_calls_half_open: u32,
    state: CircuitState,
    window: RollingWindow,
    opened_at: Option<Instant>,
    half_open_admitted: u32,
    half_open_successes: u32,
    generation: u64,
    metrics: BreakerMetrics,
}

impl BreakerCore {
    /// Create a closed breaker from configuration
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        let window = RollingWindow::new(config.sliding_window_size);
        Self {
            failure_rate_threshold: config.failure_rate_threshold,
            minimum_calls: config.minimum_calls.clamp(1, window.capacity()),
            wait_duration_open: config.wait_duration_open(),
            permitted_calls_half_open: config.permitted_calls_half_open.max(1),
            state: CircuitState::Closed,
            window,
            opened_at: None,
            half_open_admitted: 0,
            half_open_successes: 0,
            generation: 0,
            metrics: BreakerMetrics::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// Current metrics
    pub fn metrics(&self) -> BreakerMetrics {
        self.metrics
    }

    /// Rolling window of the closed state
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// Decide whether a call may proceed at `now`
    pub fn try_admit(&mut self, now: Instant) -> Admission {
        self.metrics.total_calls += 1;

        let mut transition = None;
        if self.state == CircuitState::Open && self.wait_elapsed(now) {
            transition = self.transition(CircuitState::HalfOpen, now);
        }

        let permitted = match self.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if self.half_open_admitted < self.permitted_calls_half_open {
                    self.half_open_admitted += 1;
                    true
                } else {
                    false
                }
            }
        };
        if !permitted {
            self.metrics.rejected_calls += 1;
        }

        Admission {
            permitted,
            transition,
            ticket: self.ticket(),
        }
    }

    /// Ticket for calls admitted in the current state period
    pub fn ticket(&self) -> CallTicket {
        CallTicket {
            generation: self.generation,
        }
    }

    /// Record a successful admitted call
    pub fn on_success(&mut self, ticket: CallTicket, now: Instant) -> Option<Transition> {
        self.metrics.successful_calls += 1;
        if self.is_stale(ticket) {
            return None;
        }
        match self.state {
            CircuitState::Closed => {
                self.window.record(false);
                None
            }
            CircuitState::HalfOpen => {
                self.half_open_successes += 1;
                if self.half_open_successes >= self.permitted_calls_half_open {
                    self.transition(CircuitState::Closed, now)
                } else {
                    None
                }
            }
            CircuitState::Open => None,
        }
    }

    /// Record a failed admitted call
    pub fn on_failure(&mut self, ticket: CallTicket, now: Instant) -> Option<Transition> {
        self.metrics.failed_calls += 1;
        if self.is_stale(ticket) {
            return None;
        }
        match self.state {
            CircuitState::Closed => {
                self.window.record(true);
                if self.window.len() >= self.minimum_calls
                    && self.window.failure_rate() >= self.failure_rate_threshold
                {
                    self.transition(CircuitState::Open, now)
                } else {
                    None
                }
            }
            CircuitState::HalfOpen => self.transition(CircuitState::Open, now),
            CircuitState::Open => None,
        }
    }

    /// Give back a half-open trial slot whose call never reported an outcome
    pub fn on_abandoned(&mut self, ticket: CallTicket) {
        if self.is_stale(ticket) {
            return;
        }
        if self.state == CircuitState::HalfOpen && self.half_open_admitted > self.half_open_successes
        {
            self.half_open_admitted -= 1;
        }
    }

    /// Force the circuit open from CLOSED or HALF_OPEN
    pub fn trip(&mut self, now: Instant) -> Option<Transition> {
        self.transition(CircuitState::Open, now)
    }

    /// Apply a transition if the state machine allows it
    pub fn transition(&mut self, to: CircuitState, now: Instant) -> Option<Transition> {
        let from = self.state;
        if !Transition::is_allowed(from, to) {
            return None;
        }

        self.state = to;
        self.generation += 1;
        match to {
            CircuitState::Open => {
                self.opened_at = Some(now);
                self.metrics.times_opened += 1;
            }
            CircuitState::HalfOpen => {
                self.half_open_admitted = 0;
                self.half_open_successes = 0;
            }
            CircuitState::Closed => {
                self.opened_at = None;
                self.window.clear();
            }
        }

        Some(Transition { from, to })
    }

    fn is_stale(&self, ticket: CallTicket) -> bool {
        ticket.generation != self.generation
    }

    fn wait_elapsed(&self, now: Instant) -> bool {
        self.opened_at
            .is_none_or(|opened| now.saturating_duration_since(opened) >= self.wait_duration_open)
    }
}

/// Guard around store calls
///
/// Implemented by [`CircuitBreaker`] and, when the breaker is disabled, by
/// [`NoopGuard`]. Guarded futures run through `call` on a
/// `dyn CircuitGuard`.
pub trait CircuitGuard: Send + Sync + fmt::Debug {
    /// Guard name used in logs and errors
    fn name(&self) -> &str;

    /// Ask for admission; `Err(CircuitOpen)` when rejected
    fn acquire_permission(&self) -> Result<CallTicket>;

    /// Report a successful admitted call
    fn on_success(&self, ticket: CallTicket);

    /// Report a failed admitted call
    fn on_failure(&self, ticket: CallTicket, error: &Error);

    /// Report an admitted call that was dropped before completing
    fn on_abandoned(&self, ticket: CallTicket);

    /// Current state
    fn state(&self) -> CircuitState;

    /// Current metrics
    fn metrics(&self) -> BreakerMetrics;
}

impl dyn CircuitGuard + '_ {
    /// Run `operation` through the guard
    ///
    /// Rejected calls return `Error::CircuitOpen` without running the
    /// operation. Validation errors are not counted as failures.
    pub async fn call<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let ticket = self.acquire_permission()?;

        let mut permit = PendingCall {
            guard: self,
            ticket,
            settled: false,
        };
        let result = operation().await;
        permit.settled = true;

        match &result {
            Ok(_) => self.on_success(ticket),
            Err(e) if e.is_validation() => self.on_abandoned(ticket),
            Err(e) => self.on_failure(ticket, e),
        }
        result
    }
}

/// Reports abandonment when a guarded future is dropped mid-call
struct PendingCall<'a> {
    guard: &'a dyn CircuitGuard,
    ticket: CallTicket,
    settled: bool,
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.guard.on_abandoned(self.ticket);
        }
    }
}

/// Thread-safe circuit breaker
pub struct CircuitBreaker {
    name: String,
    core: Mutex<BreakerCore>,
}

impl CircuitBreaker {
    /// Create a closed breaker from configuration
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        let breaker = Self {
            name: config.name.clone(),
            core: Mutex::new(BreakerCore::new(config)),
        };
        breaker.publish_state(CircuitState::Closed);
        breaker
    }

    /// Force the circuit open
    ///
    /// No-op when already open.
    pub fn trip(&self) {
        let transition = self.with_core(|core| core.trip(Instant::now()));
        self.report(transition);
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut BreakerCore) -> R) -> R {
        let mut core = self.core.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut core)
    }

    fn report(&self, transition: Option<Transition>) {
        let Some(Transition { from, to }) = transition else {
            return;
        };
        if to == CircuitState::Open {
            warn!(breaker = %self.name, %from, %to, "Circuit breaker opened");
        } else {
            info!(breaker = %self.name, %from, %to, "Circuit breaker state changed");
        }
        counter!("kvc_circuit_breaker_transitions_total", "breaker" => self.name.clone(), "state" => to.as_str())
            .increment(1);
        self.publish_state(to);
    }

    fn publish_state(&self, state: CircuitState) {
        gauge!(METRIC_BREAKER_STATE, "breaker" => self.name.clone()).set(state.as_gauge());
    }
}

impl CircuitGuard for CircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire_permission(&self) -> Result<CallTicket> {
        let admission = self.with_core(|core| core.try_admit(Instant::now()));
        self.report(admission.transition);
        if admission.permitted {
            Ok(admission.ticket)
        } else {
            debug!(breaker = %self.name, "Call rejected by circuit breaker");
            Err(Error::circuit_open(&self.name))
        }
    }

    fn on_success(&self, ticket: CallTicket) {
        let transition = self.with_core(|core| core.on_success(ticket, Instant::now()));
        self.report(transition);
    }

    fn on_failure(&self, ticket: CallTicket, error: &Error) {
        debug!(breaker = %self.name, error_kind = error.kind(), "Guarded call failed");
        let transition = self.with_core(|core| core.on_failure(ticket, Instant::now()));
        self.report(transition);
    }

    fn on_abandoned(&self, ticket: CallTicket) {
        self.with_core(|core| core.on_abandoned(ticket));
    }

    fn state(&self) -> CircuitState {
        self.with_core(|core| core.state())
    }

    fn metrics(&self) -> BreakerMetrics {
        self.with_core(|core| core.metrics())
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Guard that admits every call
#[derive(Debug, Clone)]
pub struct NoopGuard {
    name: String,
}

impl NoopGuard {
    /// Create a pass-through guard
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into() }
    }
}

impl CircuitGuard for NoopGuard {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire_permission(&self) -> Result<CallTicket> {
        Ok(CallTicket::default())
    }

    fn on_success(&self, _ticket: CallTicket) {}

    fn on_failure(&self, _ticket: CallTicket, _error: &Error) {}

    fn on_abandoned(&self, _ticket: CallTicket) {}

    fn state(&self) -> CircuitState {
        CircuitState::Closed
    }

    fn metrics(&self) -> BreakerMetrics {
        BreakerMetrics::default()
    }
}

/// Breaker or pass-through guard, depending on `config.enabled`
pub fn guard_from_config(config: &CircuitBreakerConfig) -> Arc<dyn CircuitGuard> {
    if config.enabled {
        Arc::new(CircuitBreaker::new(config))
    } else {
        Arc::new(NoopGuard::new(config.name.clone()))
    }
}
