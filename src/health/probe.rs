//! Health probing against region endpoints.
//!
//! A probe round succeeds only if every declared endpoint answers its
//! expected status within the timeout; any single failure or timeout fails
//! the whole round.

use crate::config::RegionConfig;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of one probe round against a region.
#[derive(Clone, Debug)]
pub struct ProbeReport {
    /// Region probed
    pub region_id: String,
    /// Every endpoint answered its expected status in time
    pub healthy: bool,
    /// Round-trip time of the round, when successful
    pub latency_ms: Option<u64>,
    /// Failure description, when unsuccessful
    pub error: Option<String>,
}

impl ProbeReport {
    /// Build a successful report.
    pub fn success(region_id: &str, latency_ms: u64) -> Self {
        Self {
            region_id: region_id.to_string(),
            healthy: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    /// Build a failed report.
    pub fn failure(region_id: &str, error: impl Into<String>) -> Self {
        Self {
            region_id: region_id.to_string(),
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// Issues health probes against a region's declared endpoints.
///
/// The production implementation speaks HTTP; tests substitute scripted
/// outcomes through this seam.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe every declared endpoint of a region.
    async fn probe(&self, region: &RegionConfig, timeout: Duration) -> ProbeReport;
}

/// HTTP prober backed by a shared client.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Create a prober with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, region: &RegionConfig, timeout: Duration) -> ProbeReport {
        let started = Instant::now();

        for endpoint in &region.health_endpoints {
            let url = endpoint.url(&region.deployment_url);
            debug!(region = %region.id, url = %url, "probing endpoint");

            match self.client.get(&url).timeout(timeout).send().await {
                Ok(response) if response.status().as_u16() == endpoint.expected_status => {}
                Ok(response) => {
                    return ProbeReport::failure(
                        &region.id,
                        format!(
                            "{} answered HTTP {}, expected {}",
                            url,
                            response.status().as_u16(),
                            endpoint.expected_status
                        ),
                    );
                }
                Err(err) => {
                    return ProbeReport::failure(&region.id, format!("{} unreachable: {}", url, err));
                }
            }
        }

        ProbeReport::success(&region.id, started.elapsed().as_millis() as u64)
    }
}
