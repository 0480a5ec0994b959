//! Routing and failover policy model.
//!
//! The global policy block of the configuration document: selection
//! strategy, geo rules, and failover thresholds.

use serde::{Deserialize, Serialize};

/// Region selection strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutingStrategy {
    /// Route by caller geography
    #[serde(rename = "geo-based")]
    Geo,
    /// Route to the lowest observed p95 latency
    #[serde(rename = "latency-based")]
    Latency,
    /// Route by configured priority
    #[default]
    #[serde(rename = "priority-based")]
    Priority,
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geo => write!(f, "geo-based"),
            Self::Latency => write!(f, "latency-based"),
            Self::Priority => write!(f, "priority-based"),
        }
    }
}

/// A geo routing rule. Rules are evaluated in declaration order and the
/// first match wins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoRoutingRule {
    /// Source countries this rule matches (ISO 3166-1 alpha-2)
    pub source_countries: Vec<String>,
    /// Preferred region
    pub target_region: String,
    /// Region used when the target is filtered out
    #[serde(default)]
    pub fallback_region: Option<String>,
}

impl GeoRoutingRule {
    /// Create a rule without a fallback.
    pub fn new(source_countries: Vec<&str>, target_region: &str) -> Self {
        Self {
            source_countries: source_countries.iter().map(|c| c.to_string()).collect(),
            target_region: target_region.to_string(),
            fallback_region: None,
        }
    }

    /// Set the fallback region.
    pub fn with_fallback(mut self, fallback: &str) -> Self {
        self.fallback_region = Some(fallback.to_string());
        self
    }

    /// Check if the rule matches a source country.
    pub fn matches(&self, country: &str) -> bool {
        self.source_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country))
    }
}

/// Failover thresholds and probe timings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FailoverPolicy {
    /// Health check interval (seconds)
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Per-probe timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Consecutive failed probes before a region is unhealthy
    #[serde(default = "default_unhealthy_threshold")]
    pub unhealthy_threshold: u32,
    /// Consecutive successful probes before a region recovers
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: u32,
    /// Failures that open a region's circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// Half-open successes that close the circuit
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    /// Seconds an open circuit waits before allowing a trial
    #[serde(default = "default_reset_timeout")]
    pub reset_timeout_seconds: u64,
}

fn default_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    5
}

fn default_unhealthy_threshold() -> u32 {
    3
}

fn default_healthy_threshold() -> u32 {
    2
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_success_threshold() -> u32 {
    3
}

fn default_reset_timeout() -> u64 {
    60
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
            timeout_seconds: default_timeout(),
            unhealthy_threshold: default_unhealthy_threshold(),
            healthy_threshold: default_healthy_threshold(),
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            reset_timeout_seconds: default_reset_timeout(),
        }
    }
}

/// Global routing policy block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoutingPolicy {
    /// Selection strategy
    #[serde(default)]
    pub strategy: RoutingStrategy,
    /// Geo rules, first match wins
    #[serde(default)]
    pub geo_rules: Vec<GeoRoutingRule>,
    /// Failover parameters
    #[serde(default)]
    pub failover: FailoverPolicy,
}

/// Top-level configuration document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouterConfig {
    /// All known regions
    pub regions: Vec<super::region::RegionConfig>,
    /// Global policy
    #[serde(default)]
    pub policy: RoutingPolicy,
}
