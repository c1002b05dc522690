//! Resilience primitives
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`circuit_breaker`] | Failure-rate circuit breaker with an explicit state machine |
//! | [`retry`] | Exponential backoff with jitter for transient store failures |

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{
    BreakerMetrics, CallTicket, CircuitBreaker, CircuitGuard, CircuitState, NoopGuard,
    guard_from_config,
};
pub use retry::RetryPolicy;
