//! Per-region circuit breaker state machine.
//!
//! CLOSED -> OPEN -> HALF_OPEN -> (CLOSED | OPEN). Probe outcomes and
//! real-traffic feedback both land in [`CircuitBreaker::record_outcome`],
//! the single place transition logic lives.

use crate::config::FailoverPolicy;
use crate::core::{now, Timestamp};
use serde::{Deserialize, Serialize};

/// Circuit state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Traffic flows normally
    Closed,
    /// Region is cut off until the reset timeout elapses
    Open,
    /// Trial traffic is allowed to exercise recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// A state transition taken by the machine.
pub type Transition = (CircuitState, CircuitState);

/// Point-in-time copy of a breaker's state, safe to hand to callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// Current state
    pub state: CircuitState,
    /// Failures observed in the current state
    pub failure_count: u32,
    /// Successes observed in the current state
    pub success_count: u32,
    /// When the last failure was recorded
    pub last_failure: Option<Timestamp>,
    /// When an open circuit next allows a trial
    pub next_attempt: Option<Timestamp>,
}

/// Circuit breaker for a single region.
#[derive(Clone, Debug)]
pub struct CircuitBreaker {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure: Option<Timestamp>,
    next_attempt: Option<Timestamp>,
    failure_threshold: u32,
    success_threshold: u32,
    reset_timeout: chrono::Duration,
}

impl CircuitBreaker {
    /// Create a closed breaker with the policy's thresholds.
    pub fn new(policy: &FailoverPolicy) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure: None,
            next_attempt: None,
            failure_threshold: policy.failure_threshold,
            success_threshold: policy.success_threshold,
            reset_timeout: chrono::Duration::seconds(policy.reset_timeout_seconds as i64),
        }
    }

    /// Current state after applying the lazy OPEN -> HALF_OPEN transition.
    ///
    /// An open circuit does not recover on a timer; it flips to half-open
    /// on the first touch at or past `next_attempt`.
    pub fn current_state(&mut self) -> (CircuitState, Option<Transition>) {
        let transition = self.tick();
        (self.state, transition)
    }

    /// Record one success or failure outcome from either signal source.
    ///
    /// Returns the transitions taken, oldest first. Most outcomes take
    /// none; an outcome that first trips the lazy half-open check can
    /// take two.
    pub fn record_outcome(&mut self, success: bool) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if let Some(t) = self.tick() {
            transitions.push(t);
        }

        match (self.state, success) {
            (CircuitState::Closed, true) => {
                self.success_count += 1;
                self.failure_count = 0;
            }
            (CircuitState::Closed, false) => {
                self.failure_count += 1;
                self.last_failure = Some(now());
                if self.failure_count >= self.failure_threshold {
                    transitions.push(self.open());
                }
            }
            (CircuitState::HalfOpen, true) => {
                self.success_count += 1;
                if self.success_count >= self.success_threshold {
                    transitions.push(self.close());
                }
            }
            (CircuitState::HalfOpen, false) => {
                // One failed trial is enough to re-open.
                self.failure_count += 1;
                self.last_failure = Some(now());
                transitions.push(self.open());
            }
            (CircuitState::Open, true) => {
                self.success_count += 1;
            }
            (CircuitState::Open, false) => {
                self.failure_count += 1;
                self.last_failure = Some(now());
            }
        }

        transitions
    }

    /// Point-in-time copy of the breaker's state.
    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            state: self.state,
            failure_count: self.failure_count,
            success_count: self.success_count,
            last_failure: self.last_failure,
            next_attempt: self.next_attempt,
        }
    }

    fn tick(&mut self) -> Option<Transition> {
        if self.state == CircuitState::Open {
            if let Some(next_attempt) = self.next_attempt {
                if now() >= next_attempt {
                    self.state = CircuitState::HalfOpen;
                    // next_attempt is only meaningful while open.
                    self.next_attempt = None;
                    self.failure_count = 0;
                    self.success_count = 0;
                    return Some((CircuitState::Open, CircuitState::HalfOpen));
                }
            }
        }
        None
    }

    fn open(&mut self) -> Transition {
        let from = self.state;
        self.state = CircuitState::Open;
        self.success_count = 0;
        self.next_attempt = Some(now() + self.reset_timeout);
        (from, CircuitState::Open)
    }

    fn close(&mut self) -> Transition {
        let from = self.state;
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.success_count = 0;
        self.next_attempt = None;
        (from, CircuitState::Closed)
    }
}
