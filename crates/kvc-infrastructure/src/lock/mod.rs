//! Distributed lock service
//!
//! Lease-based mutual exclusion on top of the store. The lock state lives
//! in the store, not in the process:
//!
//! ```text
//! UNLOCKED ──acquire──▶ LOCKED ──release or lease expiry──▶ UNLOCKED
//! ```
//!
//! Every store call made here passes through the circuit breaker.

mod guard;
pub mod service;

pub use service::LockService;
