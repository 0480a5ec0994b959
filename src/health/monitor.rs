//! Background health monitoring loop.
//!
//! Probes every active region on a fixed interval, feeding probe outcomes
//! into the health registry, the latency tracker, and the circuit
//! breakers. Probe failures become failure signals; they never escape the
//! loop, so one failing region cannot crash monitoring for others.

use crate::breaker::BreakerBank;
use crate::config::{FailoverPolicy, RegionCatalog};
use crate::health::latency::LatencyTracker;
use crate::health::probe::{ProbeReport, Prober};
use crate::health::status::HealthRegistry;
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodic prober for every active region.
///
/// Each tick probes all active regions concurrently, one probe in flight
/// per region.
pub struct HealthMonitor {
    catalog: RegionCatalog,
    policy: FailoverPolicy,
    prober: Arc<dyn Prober>,
    health: Arc<HealthRegistry>,
    latency: Arc<LatencyTracker>,
    breakers: Arc<BreakerBank>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    /// Create a monitor over the shared per-region state.
    pub fn new(
        catalog: RegionCatalog,
        prober: Arc<dyn Prober>,
        health: Arc<HealthRegistry>,
        latency: Arc<LatencyTracker>,
        breakers: Arc<BreakerBank>,
    ) -> Self {
        let policy = catalog.policy().failover.clone();
        Self {
            catalog,
            policy,
            prober,
            health,
            latency,
            breakers,
            handle: Mutex::new(None),
        }
    }

    /// Run one probe round over every active region.
    pub async fn probe_once(&self) {
        let timeout = Duration::from_secs(self.policy.timeout_seconds);
        let regions = self.catalog.active_regions();

        let reports = join_all(
            regions
                .iter()
                .map(|region| self.prober.probe(region, timeout)),
        )
        .await;

        for report in reports {
            self.apply_report(report);
        }
    }

    /// Start the probe loop. A second start while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut handle = self.handle.lock().unwrap();
        if handle.is_some() {
            return;
        }

        let monitor = Arc::clone(self);
        let interval = Duration::from_secs(self.policy.interval_seconds);
        *handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                monitor.probe_once().await;
            }
        }));

        info!(
            interval_seconds = self.policy.interval_seconds,
            regions = self.catalog.active_regions().len(),
            "health monitoring started"
        );
    }

    /// Stop the probe loop. Idempotent and safe before `start`.
    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
            info!("health monitoring stopped");
        }
    }

    fn apply_report(&self, report: ProbeReport) {
        let region_id = report.region_id.as_str();

        if report.healthy {
            if let Some(latency_ms) = report.latency_ms {
                self.latency.record(region_id, latency_ms);
                self.health
                    .set_latency_p95(region_id, self.latency.p95(region_id));
            }
            debug!(region = %region_id, latency_ms = ?report.latency_ms, "probe succeeded");
        } else {
            debug!(region = %region_id, error = ?report.error, "probe failed");
        }

        match self.health.apply_outcome(region_id, report.healthy) {
            Some(false) => warn!(region = %region_id, "region marked unhealthy"),
            Some(true) => info!(region = %region_id, "region recovered"),
            None => {}
        }

        // Probes are one of the breaker's two signal sources; callers
        // reporting real traffic are the other.
        let _ = self.breakers.record_outcome(region_id, report.healthy);
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegionConfig, RouterConfig, RoutingPolicy};
    use crate::health::probe::ProbeReport;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct ScriptedProber {
        healthy: AtomicBool,
    }

    impl ScriptedProber {
        fn new(healthy: bool) -> Self {
            Self {
                healthy: AtomicBool::new(healthy),
            }
        }

        fn set_healthy(&self, healthy: bool) {
            self.healthy.store(healthy, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, region: &RegionConfig, _timeout: Duration) -> ProbeReport {
            if self.healthy.load(Ordering::SeqCst) {
                ProbeReport::success(&region.id, 25)
            } else {
                ProbeReport::failure(&region.id, "scripted failure")
            }
        }
    }

    fn test_monitor(prober: Arc<ScriptedProber>) -> Arc<HealthMonitor> {
        let catalog = RegionCatalog::from_config(RouterConfig {
            regions: vec![
                RegionConfig::new("us-west-1", "US West", "https://us-west.example.com"),
                RegionConfig::new("eu-west-1", "EU West", "https://eu-west.example.com"),
            ],
            policy: RoutingPolicy::default(),
        })
        .unwrap();

        let policy = catalog.policy().failover.clone();
        let ids: Vec<String> = catalog.regions().iter().map(|r| r.id.clone()).collect();
        let health = Arc::new(HealthRegistry::new(ids.clone(), &policy));
        let latency = Arc::new(LatencyTracker::new());
        let breakers = Arc::new(BreakerBank::new(ids, &policy));

        Arc::new(HealthMonitor::new(
            catalog, prober, health, latency, breakers,
        ))
    }

    #[tokio::test]
    async fn test_probe_round_updates_latency() {
        let prober = Arc::new(ScriptedProber::new(true));
        let monitor = test_monitor(prober);

        monitor.probe_once().await;

        assert_eq!(monitor.latency.p95("us-west-1"), Some(25));
        let snapshot = monitor.health.snapshot();
        assert_eq!(snapshot["us-west-1"].latency_p95_ms, Some(25));
        assert!(snapshot["us-west-1"].last_check.is_some());
    }

    #[tokio::test]
    async fn test_failed_rounds_flip_health_at_threshold() {
        let prober = Arc::new(ScriptedProber::new(false));
        let monitor = test_monitor(Arc::clone(&prober));

        // Default unhealthy_threshold is 3.
        monitor.probe_once().await;
        monitor.probe_once().await;
        assert!(monitor.health.is_healthy("us-west-1"));

        monitor.probe_once().await;
        assert!(!monitor.health.is_healthy("us-west-1"));
        assert!(!monitor.health.is_healthy("eu-west-1"));
    }

    #[tokio::test]
    async fn test_failed_rounds_feed_the_breaker() {
        let prober = Arc::new(ScriptedProber::new(false));
        let monitor = test_monitor(Arc::clone(&prober));

        // Default failure_threshold is 5.
        for _ in 0..5 {
            monitor.probe_once().await;
        }
        assert!(!monitor.breakers.is_candidate("us-west-1"));
    }

    #[tokio::test]
    async fn test_recovery_after_consecutive_successes() {
        let prober = Arc::new(ScriptedProber::new(false));
        let monitor = test_monitor(Arc::clone(&prober));

        for _ in 0..3 {
            monitor.probe_once().await;
        }
        assert!(!monitor.health.is_healthy("us-west-1"));

        prober.set_healthy(true);
        monitor.probe_once().await;
        assert!(!monitor.health.is_healthy("us-west-1"));
        monitor.probe_once().await;
        assert!(monitor.health.is_healthy("us-west-1"));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let prober = Arc::new(ScriptedProber::new(true));
        let monitor = test_monitor(prober);

        // Stop before start, then twice after.
        monitor.stop();
        monitor.start();
        monitor.stop();
        monitor.stop();
    }

    #[tokio::test]
    async fn test_start_twice_keeps_one_loop() {
        let prober = Arc::new(ScriptedProber::new(true));
        let monitor = test_monitor(prober);

        monitor.start();
        monitor.start();
        monitor.stop();
        assert!(monitor.handle.lock().unwrap().is_none());
    }
}
