//! Circuit Breaker Module
//!
//! Provides per-region failure isolation:
//! - CLOSED / OPEN / HALF_OPEN state machine
//! - Timed recovery probing via lazy half-open transitions
//! - Transition event history

pub mod bank;
pub mod machine;

pub use bank::{BreakerBank, BreakerEvent};
pub use machine::{BreakerSnapshot, CircuitBreaker, CircuitState};
