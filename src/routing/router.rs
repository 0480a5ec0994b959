//! Region router façade.
//!
//! Composes the catalog, health tracking, circuit breakers, and selection
//! strategies behind one decision API, and owns the monitoring lifecycle.
//! Construct explicitly and inject wherever routing decisions are needed;
//! there is no process-wide instance.

use crate::breaker::{BreakerBank, BreakerEvent, BreakerSnapshot};
use crate::config::{RegionCatalog, RegionConfig};
use crate::core::Result;
use crate::health::{HealthMonitor, HealthRegistry, HttpProber, LatencyTracker, Prober, RegionHealth};
use crate::routing::strategy::{RouteRequest, StrategyEngine};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides which regional deployment serves each request.
///
/// All per-region mutable state is initialized at construction, so
/// [`RegionRouter::route`] is safe to call before any health check has
/// run: a fresh process starts every region healthy and closed.
pub struct RegionRouter {
    catalog: RegionCatalog,
    engine: StrategyEngine,
    health: Arc<HealthRegistry>,
    latency: Arc<LatencyTracker>,
    breakers: Arc<BreakerBank>,
    monitor: Arc<HealthMonitor>,
}

impl RegionRouter {
    /// Create a router probing over HTTP.
    pub fn new(catalog: RegionCatalog) -> Self {
        Self::with_prober(catalog, Arc::new(HttpProber::new()))
    }

    /// Create a router with a custom prober.
    pub fn with_prober(catalog: RegionCatalog, prober: Arc<dyn Prober>) -> Self {
        let policy = catalog.policy().failover.clone();
        let ids: Vec<String> = catalog.regions().iter().map(|r| r.id.clone()).collect();

        let health = Arc::new(HealthRegistry::new(ids.clone(), &policy));
        let latency = Arc::new(LatencyTracker::new());
        let breakers = Arc::new(BreakerBank::new(ids, &policy));
        let engine = StrategyEngine::new(catalog.policy());
        let monitor = Arc::new(HealthMonitor::new(
            catalog.clone(),
            prober,
            Arc::clone(&health),
            Arc::clone(&latency),
            Arc::clone(&breakers),
        ));

        Self {
            catalog,
            engine,
            health,
            latency,
            breakers,
            monitor,
        }
    }

    /// Load the configuration document and build a router from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(RegionCatalog::load(path)?))
    }

    /// Decide which region should serve a request.
    ///
    /// Pure composition over current state; performs no I/O. `None` means
    /// no eligible region survived filtering and the caller decides how
    /// to degrade.
    pub fn route(&self, request: &RouteRequest) -> Option<RegionConfig> {
        let candidates = self.candidates(request);
        let selected = self.engine.select(candidates, request, &self.latency);

        match selected {
            Some(region) => {
                debug!(region = %region.id, strategy = %self.engine.strategy(), "routing decision");
                Some(region.clone())
            }
            None => {
                warn!(strategy = %self.engine.strategy(), "no eligible region for request");
                None
            }
        }
    }

    /// Report that real traffic to a region succeeded.
    pub fn record_success(&self, region_id: &str) -> Result<()> {
        self.breakers.record_outcome(region_id, true)
    }

    /// Report that real traffic to a region failed.
    pub fn record_failure(&self, region_id: &str) -> Result<()> {
        self.breakers.record_outcome(region_id, false)
    }

    /// Snapshot of every region's health record.
    pub fn region_health(&self) -> HashMap<String, RegionHealth> {
        self.health.snapshot()
    }

    /// Snapshot of every region's breaker state.
    pub fn breaker_status(&self) -> HashMap<String, BreakerSnapshot> {
        self.breakers.snapshot()
    }

    /// Recent breaker transitions, oldest first.
    pub fn breaker_events(&self) -> Vec<BreakerEvent> {
        self.breakers.events()
    }

    /// The catalog this router was built from.
    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Start background health checks.
    pub fn start_health_checks(&self) {
        self.monitor.start();
    }

    /// Stop background health checks. Idempotent, safe before start.
    pub fn stop_health_checks(&self) {
        self.monitor.stop();
    }

    /// The eligibility pipeline: status, capability, residency, breaker,
    /// health — in that order, preserving catalog order.
    fn candidates(&self, request: &RouteRequest) -> Vec<&RegionConfig> {
        self.catalog
            .regions()
            .iter()
            .filter(|r| r.is_active())
            .filter(|r| {
                request
                    .capability
                    .as_deref()
                    .map_or(true, |c| r.has_capability(c))
            })
            .filter(|r| {
                request
                    .data_residency
                    .as_deref()
                    .map_or(true, |tag| r.data_residency == tag)
            })
            .filter(|r| self.breakers.is_candidate(&r.id))
            .filter(|r| self.health.is_healthy(&r.id))
            .collect()
    }
}
