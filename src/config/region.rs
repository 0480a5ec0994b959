//! Region configuration model.
//!
//! Describes each regional backend deployment known to the router.
//! Immutable after load; changed only by redeploying configuration.

use serde::{Deserialize, Serialize};

/// Operational status of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionStatus {
    /// Region is in rotation
    Active,
    /// Region is configured but not serving
    Inactive,
    /// Region is undergoing maintenance
    Maintenance,
}

impl std::fmt::Display for RegionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// A health endpoint declared by a region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthEndpoint {
    /// Path relative to the deployment URL
    pub path: String,
    /// Status code a healthy endpoint answers with
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

fn default_expected_status() -> u16 {
    200
}

impl HealthEndpoint {
    /// Create an endpoint expecting HTTP 200.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            expected_status: default_expected_status(),
        }
    }

    /// Set the expected status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Full probe URL against a deployment base URL.
    pub fn url(&self, base: &str) -> String {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// A regional backend deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Unique region ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Hosting provider
    #[serde(default)]
    pub provider: String,
    /// Routing priority (lower = preferred)
    #[serde(default)]
    pub priority: u32,
    /// Operational status
    #[serde(default = "default_region_status")]
    pub status: RegionStatus,
    /// Capabilities offered by this deployment
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Data residency tag
    #[serde(default)]
    pub data_residency: String,
    /// Endpoints probed by the health monitor
    pub health_endpoints: Vec<HealthEndpoint>,
    /// Base URL of the deployment
    pub deployment_url: String,
}

fn default_region_status() -> RegionStatus {
    RegionStatus::Active
}

impl RegionConfig {
    /// Create an active region with a single `/health` endpoint.
    pub fn new(id: &str, name: &str, deployment_url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            provider: String::new(),
            priority: 0,
            status: RegionStatus::Active,
            capabilities: Vec::new(),
            data_residency: String::new(),
            health_endpoints: vec![HealthEndpoint::new("/health")],
            deployment_url: deployment_url.to_string(),
        }
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    /// Set the routing priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the operational status.
    pub fn with_status(mut self, status: RegionStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a capability.
    pub fn with_capability(mut self, capability: &str) -> Self {
        self.capabilities.push(capability.to_string());
        self
    }

    /// Set the data residency tag.
    pub fn with_residency(mut self, tag: &str) -> Self {
        self.data_residency = tag.to_string();
        self
    }

    /// Replace the health endpoint list.
    pub fn with_endpoints(mut self, endpoints: Vec<HealthEndpoint>) -> Self {
        self.health_endpoints = endpoints;
        self
    }

    /// Check if the region is in rotation.
    pub fn is_active(&self) -> bool {
        self.status == RegionStatus::Active
    }

    /// Check if the region offers a capability.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}
