//! Breakers for every configured region, plus a transition history.

use crate::breaker::machine::{BreakerSnapshot, CircuitBreaker, CircuitState, Transition};
use crate::config::FailoverPolicy;
use crate::core::{now, Error, Result, Timestamp};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use tracing::{info, warn};

/// Number of breaker transitions retained in memory.
const EVENT_HISTORY_LIMIT: usize = 256;

/// A recorded breaker transition.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct BreakerEvent {
    /// Event ID
    pub id: String,
    /// Region whose breaker transitioned
    pub region_id: String,
    /// State before
    pub from: CircuitState,
    /// State after
    pub to: CircuitState,
    /// When the transition happened
    pub timestamp: Timestamp,
}

/// Per-region circuit breakers sharing one policy.
///
/// Both the health monitor and traffic-serving callers report outcomes
/// here; there is a single breaker per region, not one per signal source.
pub struct BreakerBank {
    breakers: RwLock<HashMap<String, CircuitBreaker>>,
    events: RwLock<VecDeque<BreakerEvent>>,
}

impl BreakerBank {
    /// Create one closed breaker per region id.
    pub fn new<I>(region_ids: I, policy: &FailoverPolicy) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let breakers = region_ids
            .into_iter()
            .map(|id| (id, CircuitBreaker::new(policy)))
            .collect();
        Self {
            breakers: RwLock::new(breakers),
            events: RwLock::new(VecDeque::new()),
        }
    }

    /// Record one success or failure for a region's breaker.
    pub fn record_outcome(&self, region_id: &str, success: bool) -> Result<()> {
        let transitions = {
            let mut breakers = self.breakers.write().unwrap();
            let breaker = breakers
                .get_mut(region_id)
                .ok_or_else(|| Error::UnknownRegion(region_id.to_string()))?;
            breaker.record_outcome(success)
        };

        for transition in transitions {
            self.publish(region_id, transition);
        }
        Ok(())
    }

    /// Whether a region may be offered as a routing candidate.
    ///
    /// OPEN is never a candidate; HALF_OPEN is, so recovery traffic gets
    /// exercised. Touching the breaker here applies the lazy half-open
    /// transition.
    pub fn is_candidate(&self, region_id: &str) -> bool {
        let (state, transition) = {
            let mut breakers = self.breakers.write().unwrap();
            match breakers.get_mut(region_id) {
                Some(breaker) => breaker.current_state(),
                None => return false,
            }
        };

        if let Some(transition) = transition {
            self.publish(region_id, transition);
        }
        state != CircuitState::Open
    }

    /// Current state of a region's breaker, applying the lazy transition.
    pub fn state(&self, region_id: &str) -> Option<CircuitState> {
        let (state, transition) = {
            let mut breakers = self.breakers.write().unwrap();
            let breaker = breakers.get_mut(region_id)?;
            breaker.current_state()
        };

        if let Some(transition) = transition {
            self.publish(region_id, transition);
        }
        Some(state)
    }

    /// Defensive copy of every breaker's state.
    pub fn snapshot(&self) -> HashMap<String, BreakerSnapshot> {
        self.breakers
            .read()
            .unwrap()
            .iter()
            .map(|(id, breaker)| (id.clone(), breaker.snapshot()))
            .collect()
    }

    /// Recent transitions, oldest first.
    pub fn events(&self) -> Vec<BreakerEvent> {
        self.events.read().unwrap().iter().cloned().collect()
    }

    fn publish(&self, region_id: &str, (from, to): Transition) {
        match to {
            CircuitState::Open => {
                warn!(region = %region_id, from = %from, "circuit opened");
            }
            CircuitState::HalfOpen => {
                info!(region = %region_id, "circuit half-open, allowing trial traffic");
            }
            CircuitState::Closed => {
                info!(region = %region_id, "circuit closed, region back in rotation");
            }
        }

        let mut events = self.events.write().unwrap();
        events.push_back(BreakerEvent {
            id: uuid::Uuid::new_v4().to_string(),
            region_id: region_id.to_string(),
            from,
            to,
            timestamp: now(),
        });
        while events.len() > EVENT_HISTORY_LIMIT {
            events.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(failure: u32, success: u32, reset_seconds: u64) -> BreakerBank {
        let policy = FailoverPolicy {
            failure_threshold: failure,
            success_threshold: success,
            reset_timeout_seconds: reset_seconds,
            ..Default::default()
        };
        BreakerBank::new(vec!["us-west-1".to_string()], &policy)
    }

    #[test]
    fn test_unknown_region_rejected() {
        let bank = bank(5, 3, 60);
        assert!(matches!(
            bank.record_outcome("nope", true),
            Err(Error::UnknownRegion(_))
        ));
        assert!(!bank.is_candidate("nope"));
    }

    #[test]
    fn test_open_breaker_blocks_candidacy() {
        let bank = bank(2, 1, 3600);
        assert!(bank.is_candidate("us-west-1"));

        bank.record_outcome("us-west-1", false).unwrap();
        assert!(bank.is_candidate("us-west-1"));
        bank.record_outcome("us-west-1", false).unwrap();
        assert!(!bank.is_candidate("us-west-1"));
    }

    #[test]
    fn test_half_open_is_a_candidate() {
        let bank = bank(1, 1, 0);
        bank.record_outcome("us-west-1", false).unwrap();

        // Reset timeout of zero makes the trial window immediate.
        assert!(bank.is_candidate("us-west-1"));
        assert_eq!(bank.state("us-west-1"), Some(CircuitState::HalfOpen));
    }

    #[test]
    fn test_transitions_are_recorded() {
        let bank = bank(1, 1, 0);
        bank.record_outcome("us-west-1", false).unwrap();
        bank.record_outcome("us-west-1", true).unwrap();

        let events = bank.events();
        let states: Vec<(CircuitState, CircuitState)> =
            events.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(
            states,
            vec![
                (CircuitState::Closed, CircuitState::Open),
                (CircuitState::Open, CircuitState::HalfOpen),
                (CircuitState::HalfOpen, CircuitState::Closed),
            ]
        );
        assert!(events.iter().all(|e| e.region_id == "us-west-1"));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let bank = bank(1, 1, 3600);
        let snapshot = bank.snapshot();

        bank.record_outcome("us-west-1", false).unwrap();

        assert_eq!(snapshot["us-west-1"].state, CircuitState::Closed);
        assert_eq!(bank.snapshot()["us-west-1"].state, CircuitState::Open);
    }
}
