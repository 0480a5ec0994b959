//! Selection strategies over a filtered candidate set.
//!
//! Candidates arrive in catalog order and every strategy sorts stably, so
//! ties always resolve to the region declared first.

use crate::config::{GeoRoutingRule, RegionConfig, RoutingPolicy, RoutingStrategy};
use crate::health::LatencyTracker;

/// Constraints a caller attaches to a routing decision.
#[derive(Clone, Debug, Default)]
pub struct RouteRequest {
    /// Caller's source country (ISO 3166-1 alpha-2)
    pub source_country: Option<String>,
    /// Capability the serving region must offer
    pub capability: Option<String>,
    /// Data residency tag the serving region must carry
    pub data_residency: Option<String>,
}

impl RouteRequest {
    /// Create an unconstrained request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source country.
    pub fn with_source_country(mut self, country: &str) -> Self {
        self.source_country = Some(country.to_string());
        self
    }

    /// Require a capability.
    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capability = Some(capability.to_string());
        self
    }

    /// Require a data residency tag.
    pub fn with_data_residency(mut self, tag: &str) -> Self {
        self.data_residency = Some(tag.to_string());
        self
    }
}

/// Applies the configured selection strategy to surviving candidates.
pub struct StrategyEngine {
    strategy: RoutingStrategy,
    geo_rules: Vec<GeoRoutingRule>,
}

impl StrategyEngine {
    /// Create an engine from the global policy.
    pub fn new(policy: &RoutingPolicy) -> Self {
        Self {
            strategy: policy.strategy,
            geo_rules: policy.geo_rules.clone(),
        }
    }

    /// The strategy in effect.
    pub fn strategy(&self) -> RoutingStrategy {
        self.strategy
    }

    /// Pick one region from the filtered candidates, `None` when empty.
    pub fn select<'a>(
        &self,
        candidates: Vec<&'a RegionConfig>,
        request: &RouteRequest,
        latency: &LatencyTracker,
    ) -> Option<&'a RegionConfig> {
        if candidates.is_empty() {
            return None;
        }

        match self.strategy {
            RoutingStrategy::Geo => self.select_geo(candidates, request.source_country.as_deref()),
            RoutingStrategy::Latency => Self::select_latency(candidates, latency),
            RoutingStrategy::Priority => Self::select_priority(candidates),
        }
    }

    /// First matching rule wins; prefer its target, then its fallback,
    /// then the first surviving candidate.
    fn select_geo<'a>(
        &self,
        candidates: Vec<&'a RegionConfig>,
        source_country: Option<&str>,
    ) -> Option<&'a RegionConfig> {
        if let Some(country) = source_country {
            if let Some(rule) = self.geo_rules.iter().find(|r| r.matches(country)) {
                if let Some(target) = candidates
                    .iter()
                    .find(|r| r.id == rule.target_region)
                    .copied()
                {
                    return Some(target);
                }
                if let Some(fallback_id) = &rule.fallback_region {
                    if let Some(fallback) = candidates
                        .iter()
                        .find(|r| &r.id == fallback_id)
                        .copied()
                    {
                        return Some(fallback);
                    }
                }
            }
        }

        candidates.first().copied()
    }

    /// Lowest p95 wins; regions with no samples sort last.
    fn select_latency<'a>(
        mut candidates: Vec<&'a RegionConfig>,
        latency: &LatencyTracker,
    ) -> Option<&'a RegionConfig> {
        candidates.sort_by_key(|r| match latency.p95(&r.id) {
            Some(ms) => (0, ms),
            None => (1, 0),
        });
        candidates.first().copied()
    }

    /// Lowest priority value wins.
    fn select_priority<'a>(mut candidates: Vec<&'a RegionConfig>) -> Option<&'a RegionConfig> {
        candidates.sort_by_key(|r| r.priority);
        candidates.first().copied()
    }
}
