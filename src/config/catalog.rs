//! Region catalog loading and validation.
//!
//! The catalog fails fast at construction; the router never comes up in a
//! partially-valid state.

use crate::config::policy::{RouterConfig, RoutingPolicy};
use crate::config::region::RegionConfig;
use crate::core::{Error, Result};
use std::collections::HashSet;
use std::path::Path;

/// Validated, read-only view of the configuration document.
///
/// Preserves region declaration order; strategies break ties by catalog
/// order, so order is part of the contract.
#[derive(Clone, Debug)]
pub struct RegionCatalog {
    regions: Vec<RegionConfig>,
    policy: RoutingPolicy,
}

impl RegionCatalog {
    /// Load and validate a configuration document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: RouterConfig = serde_json::from_str(raw)?;
        Self::from_config(config)
    }

    /// Validate an already-deserialized document.
    pub fn from_config(config: RouterConfig) -> Result<Self> {
        if config.regions.is_empty() {
            return Err(Error::NoRegionsConfigured);
        }

        let mut ids = HashSet::new();
        for region in &config.regions {
            if !ids.insert(region.id.as_str()) {
                return Err(Error::DuplicateRegionId(region.id.clone()));
            }
            if region.health_endpoints.is_empty() {
                return Err(Error::MissingHealthEndpoints(region.id.clone()));
            }
        }

        for rule in &config.policy.geo_rules {
            if !ids.contains(rule.target_region.as_str()) {
                return Err(Error::UnknownGeoRuleTarget(rule.target_region.clone()));
            }
            if let Some(fallback) = &rule.fallback_region {
                if !ids.contains(fallback.as_str()) {
                    return Err(Error::UnknownGeoRuleTarget(fallback.clone()));
                }
            }
        }

        Ok(Self {
            regions: config.regions,
            policy: config.policy,
        })
    }

    /// All regions in catalog order.
    pub fn regions(&self) -> &[RegionConfig] {
        &self.regions
    }

    /// Regions in rotation, catalog order.
    pub fn active_regions(&self) -> Vec<&RegionConfig> {
        self.regions.iter().filter(|r| r.is_active()).collect()
    }

    /// Look up a region by id.
    pub fn get(&self, id: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// The global routing policy.
    pub fn policy(&self) -> &RoutingPolicy {
        &self.policy
    }

    /// Number of configured regions.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::policy::GeoRoutingRule;
    use crate::config::region::RegionStatus;

    fn test_config() -> RouterConfig {
        RouterConfig {
            regions: vec![
                RegionConfig::new("us-west-1", "US West", "https://us-west.example.com"),
                RegionConfig::new("eu-west-1", "EU West", "https://eu-west.example.com"),
            ],
            policy: RoutingPolicy::default(),
        }
    }

    #[test]
    fn test_valid_catalog() {
        let catalog = RegionCatalog::from_config(test_config()).unwrap();
        assert_eq!(catalog.region_count(), 2);
        assert!(catalog.get("eu-west-1").is_some());
        assert!(catalog.get("ap-south-1").is_none());
    }

    #[test]
    fn test_duplicate_region_id_rejected() {
        let mut config = test_config();
        config.regions.push(RegionConfig::new(
            "us-west-1",
            "US West Again",
            "https://other.example.com",
        ));

        let err = RegionCatalog::from_config(config).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegionId(id) if id == "us-west-1"));
    }

    #[test]
    fn test_empty_regions_rejected() {
        let config = RouterConfig {
            regions: Vec::new(),
            policy: RoutingPolicy::default(),
        };
        assert!(matches!(
            RegionCatalog::from_config(config),
            Err(Error::NoRegionsConfigured)
        ));
    }

    #[test]
    fn test_missing_endpoints_rejected() {
        let mut config = test_config();
        config.regions[0] = config.regions[0].clone().with_endpoints(Vec::new());

        let err = RegionCatalog::from_config(config).unwrap_err();
        assert!(matches!(err, Error::MissingHealthEndpoints(id) if id == "us-west-1"));
    }

    #[test]
    fn test_dangling_geo_rule_rejected() {
        let mut config = test_config();
        config.policy.geo_rules = vec![GeoRoutingRule::new(vec!["DE"], "eu-central-1")];

        let err = RegionCatalog::from_config(config).unwrap_err();
        assert!(matches!(err, Error::UnknownGeoRuleTarget(id) if id == "eu-central-1"));
    }

    #[test]
    fn test_dangling_geo_fallback_rejected() {
        let mut config = test_config();
        config.policy.geo_rules =
            vec![GeoRoutingRule::new(vec!["DE"], "eu-west-1").with_fallback("eu-central-1")];

        assert!(RegionCatalog::from_config(config).is_err());
    }

    #[test]
    fn test_active_regions_preserve_order() {
        let mut config = test_config();
        config.regions.insert(
            1,
            RegionConfig::new("us-east-1", "US East", "https://us-east.example.com")
                .with_status(RegionStatus::Inactive),
        );

        let catalog = RegionCatalog::from_config(config).unwrap();
        let active: Vec<&str> = catalog
            .active_regions()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(active, vec!["us-west-1", "eu-west-1"]);
    }

    #[test]
    fn test_load_from_json_document() {
        let catalog = RegionCatalog::from_json(
            r#"{
                "regions": [
                    {
                        "id": "eu-west-1",
                        "name": "EU West",
                        "provider": "aws",
                        "priority": 1,
                        "capabilities": ["inference"],
                        "data_residency": "eu",
                        "health_endpoints": [{"path": "/health"}, {"path": "/ready", "expected_status": 204}],
                        "deployment_url": "https://eu-west.example.com"
                    }
                ],
                "policy": {
                    "strategy": "latency-based",
                    "failover": {"interval_seconds": 10}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(catalog.region_count(), 1);
        assert_eq!(catalog.policy().failover.interval_seconds, 10);
        assert_eq!(catalog.policy().failover.timeout_seconds, 5);
    }

    #[test]
    fn test_malformed_document_rejected() {
        assert!(RegionCatalog::from_json("{not json").is_err());
        assert!(RegionCatalog::from_json(r#"{"regions": [], "policy": {"strategy": "coin-flip"}}"#).is_err());
    }
}
