//! Health Module
//!
//! Provides per-region health tracking:
//! - Periodic endpoint probing
//! - Consecutive-outcome hysteresis
//! - Rolling latency windows with p95

pub mod latency;
pub mod monitor;
pub mod probe;
pub mod status;

pub use latency::LatencyTracker;
pub use monitor::HealthMonitor;
pub use probe::{HttpProber, ProbeReport, Prober};
pub use status::{HealthRegistry, RegionHealth};
