//! Per-region health records with hysteresis.
//!
//! A region flips unhealthy only after `unhealthy_threshold` consecutive
//! failed probes, and recovers only after `healthy_threshold` consecutive
//! successes, so single flakes never cause routing churn.

use crate::config::FailoverPolicy;
use crate::core::{now, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Mutable health record for one region.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionHealth {
    /// Region currently considered healthy
    pub healthy: bool,
    /// Consecutive failed probe rounds
    pub consecutive_failures: u32,
    /// Consecutive successful probe rounds
    pub consecutive_successes: u32,
    /// When the region was last probed
    pub last_check: Option<Timestamp>,
    /// 95th-percentile probe latency, derived from the latency tracker
    pub latency_p95_ms: Option<u64>,
}

impl RegionHealth {
    /// Create a record for a freshly configured region.
    pub fn new() -> Self {
        Self {
            healthy: true,
            consecutive_failures: 0,
            consecutive_successes: 0,
            last_check: None,
            latency_p95_ms: None,
        }
    }

    /// Apply one probe outcome. Returns `true` when the healthy flag
    /// flipped.
    pub fn apply_outcome(
        &mut self,
        success: bool,
        unhealthy_threshold: u32,
        healthy_threshold: u32,
    ) -> bool {
        self.last_check = Some(now());

        if success {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
            if !self.healthy && self.consecutive_successes >= healthy_threshold {
                self.healthy = true;
                return true;
            }
        } else {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
            if self.healthy && self.consecutive_failures >= unhealthy_threshold {
                self.healthy = false;
                return true;
            }
        }

        false
    }
}

impl Default for RegionHealth {
    fn default() -> Self {
        Self::new()
    }
}

/// Health records for every configured region, guarded for concurrent
/// access from the monitor loop and introspection callers.
pub struct HealthRegistry {
    records: RwLock<HashMap<String, RegionHealth>>,
    unhealthy_threshold: u32,
    healthy_threshold: u32,
}

impl HealthRegistry {
    /// Create a registry with one fresh record per region id.
    pub fn new<I>(region_ids: I, policy: &FailoverPolicy) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let records = region_ids
            .into_iter()
            .map(|id| (id, RegionHealth::new()))
            .collect();
        Self {
            records: RwLock::new(records),
            unhealthy_threshold: policy.unhealthy_threshold,
            healthy_threshold: policy.healthy_threshold,
        }
    }

    /// Apply a probe outcome for a region. Returns the new healthy flag
    /// when it flipped, `None` otherwise or for unknown regions.
    pub fn apply_outcome(&self, region_id: &str, success: bool) -> Option<bool> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(region_id)?;
        record
            .apply_outcome(success, self.unhealthy_threshold, self.healthy_threshold)
            .then_some(record.healthy)
    }

    /// Current healthy flag for a region. Unknown regions are not healthy.
    pub fn is_healthy(&self, region_id: &str) -> bool {
        self.records
            .read()
            .unwrap()
            .get(region_id)
            .map_or(false, |r| r.healthy)
    }

    /// Store the derived p95 latency for a region.
    pub fn set_latency_p95(&self, region_id: &str, p95_ms: Option<u64>) {
        if let Some(record) = self.records.write().unwrap().get_mut(region_id) {
            record.latency_p95_ms = p95_ms;
        }
    }

    /// Defensive copy of every record, taken under the write-side lock.
    pub fn snapshot(&self) -> HashMap<String, RegionHealth> {
        self.records.read().unwrap().clone()
    }
}
