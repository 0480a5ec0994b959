//! Rolling latency windows and percentile computation.
//!
//! Keeps a bounded history of probe latencies per region and computes the
//! 95th percentile on demand.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

/// Default number of samples retained per region.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Per-region bounded windows of observed probe latencies.
///
/// `record` and `p95` are safe to call concurrently; reads work on a
/// snapshot copy and never mutate the shared window.
pub struct LatencyTracker {
    windows: RwLock<HashMap<String, VecDeque<u64>>>,
    capacity: usize,
}

impl LatencyTracker {
    /// Create a tracker with the default window size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW_SIZE)
    }

    /// Create a tracker with a custom window size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Record a sample, evicting the oldest once the window is full.
    pub fn record(&self, region_id: &str, latency_ms: u64) {
        let mut windows = self.windows.write().unwrap();
        let window = windows.entry(region_id.to_string()).or_default();
        window.push_back(latency_ms);
        while window.len() > self.capacity {
            window.pop_front();
        }
    }

    /// 95th percentile of the current window, `None` when no samples exist.
    pub fn p95(&self, region_id: &str) -> Option<u64> {
        let windows = self.windows.read().unwrap();
        let window = windows.get(region_id)?;
        if window.is_empty() {
            return None;
        }

        let mut samples: Vec<u64> = window.iter().copied().collect();
        samples.sort_unstable();
        let idx = (samples.len() as f64 * 0.95).floor() as usize;
        Some(samples[idx.min(samples.len() - 1)])
    }

    /// Number of samples currently held for a region.
    pub fn sample_count(&self, region_id: &str) -> usize {
        self.windows
            .read()
            .unwrap()
            .get(region_id)
            .map_or(0, |w| w.len())
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}
