//! Health monitor: probe scheduling, snapshots and alerting

use super::components::{check_database, check_disk, check_http, check_memory, check_tasks};
use super::database::DatabaseHandle;
use super::recovery::RecoveryAction;
use super::sampler::RuntimeSampler;
use super::types::{AlertThreshold, HealthCheck, HealthState, ProbeKind, default_thresholds};
use crate::config::HealthMonitorConfig;
use crate::monitoring::alerts::AlertManager;
use crate::monitoring::metrics::AlertMetrics;
use crate::monitoring::shutdown::{Lifecycle, ShutdownSignal};
use crate::monitoring::types::{Alert, AlertSeverity};
use crate::utils::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Periodically probes the process and its dependencies
///
/// Each probe writes its own snapshot entry, so probes only synchronize when
/// storing a result.
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    pub(super) config: HealthMonitorConfig,
    /// Latest result per probe name
    snapshot: Arc<RwLock<HashMap<String, HealthCheck>>>,
    thresholds: Arc<RwLock<HashMap<String, AlertThreshold>>>,
    /// First non-healthy result per probe still inside its threshold's `min_duration`
    breach_since: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    pub(super) recoveries: Arc<RwLock<HashMap<String, Arc<dyn RecoveryAction>>>>,
    alerts: AlertManager,
    metrics: AlertMetrics,
    db: Option<Arc<dyn DatabaseHandle>>,
    sampler: Arc<dyn RuntimeSampler>,
    http: reqwest::Client,
    lifecycle: Arc<Lifecycle>,
}

impl HealthMonitor {
    /// Create a new health monitor
    pub fn new(
        config: HealthMonitorConfig,
        alerts: AlertManager,
        metrics: AlertMetrics,
        db: Option<Arc<dyn DatabaseHandle>>,
        sampler: Arc<dyn RuntimeSampler>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| WatchError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            snapshot: Arc::new(RwLock::new(HashMap::new())),
            thresholds: Arc::new(RwLock::new(default_thresholds())),
            breach_since: Arc::new(RwLock::new(HashMap::new())),
            recoveries: Arc::new(RwLock::new(HashMap::new())),
            alerts,
            metrics,
            db,
            sampler,
            http,
            lifecycle: Arc::new(Lifecycle::default()),
        })
    }

    /// Start probing: one pass right away, then one every `interval`
    pub async fn start(&self, signal: ShutdownSignal) -> Result<()> {
        let stop = self.lifecycle.begin("health monitor")?;
        info!(
            "Starting health monitor (checks every {:?})",
            self.config.interval
        );
        self.spawn_check_loop(signal, stop);
        Ok(())
    }

    /// Stop probing; passes already running finish on their own
    pub async fn stop(&self) -> Result<()> {
        self.lifecycle.end("health monitor")?;
        info!("Stopped health monitor");
        Ok(())
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Run every probe concurrently and process each result
    pub async fn check_all(&self) -> Vec<HealthCheck> {
        debug!("Running health checks");
        join_all(ProbeKind::ALL.into_iter().map(|kind| async move {
            let check = self.run_probe(kind).await;
            self.handle_result(kind, &check).await;
            check
        }))
        .await
    }

    /// Run one probe and process its result
    pub async fn check(&self, kind: ProbeKind) -> HealthCheck {
        let check = self.run_probe(kind).await;
        self.handle_result(kind, &check).await;
        check
    }

    async fn run_probe(&self, kind: ProbeKind) -> HealthCheck {
        match kind {
            ProbeKind::Database => check_database(self.db.as_ref(), self.config.probe_timeout).await,
            ProbeKind::Http => check_http(&self.http, &self.config.http_endpoints).await,
            ProbeKind::Memory | ProbeKind::Tasks | ProbeKind::Disk => self.run_sampled(kind).await,
        }
    }

    /// Sampling reads `/proc` and the mount table, so it runs off the async workers
    async fn run_sampled(&self, kind: ProbeKind) -> HealthCheck {
        let sampler = self.sampler.clone();
        tokio::task::spawn_blocking(move || match kind {
            ProbeKind::Memory => check_memory(sampler.as_ref()),
            ProbeKind::Tasks => check_tasks(sampler.as_ref()),
            _ => check_disk(sampler.as_ref()),
        })
        .await
        .unwrap_or_else(|e| {
            HealthCheck::new(
                kind.name(),
                HealthState::Unhealthy,
                format!("{} probe task failed: {}", kind.name(), e),
                Duration::ZERO,
            )
        })
    }

    /// Store the result, record metrics, then raise or clear the probe's alert
    async fn handle_result(&self, kind: ProbeKind, check: &HealthCheck) {
        self.snapshot
            .write()
            .insert(check.name.clone(), check.clone());
        self.metrics.record_health_check(check);
        self.export_probe_values(kind, check);

        let threshold = self.thresholds.read().get(kind.name()).cloned();
        let Some(threshold) = threshold.filter(|t| t.enabled) else {
            return;
        };

        let alert_id = format!("health_{}", check.name);
        let severity = match check.status {
            HealthState::Healthy => {
                self.breach_since.write().remove(&check.name);
                match self.alerts.resolve_alert(&alert_id).await {
                    Ok(_) => info!("Health check {} recovered", check.name),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => warn!("Failed to resolve alert {}: {}", alert_id, e),
                }
                return;
            }
            HealthState::Degraded => AlertSeverity::Warning,
            HealthState::Unhealthy => AlertSeverity::Critical,
        };

        if !self.breach_held(&check.name, &threshold, check.timestamp) {
            return;
        }

        let limit = if severity == AlertSeverity::Critical {
            threshold.critical
        } else {
            threshold.warning
        };
        let mut alert = Alert::new(
            alert_id.clone(),
            kind.alert_type(),
            severity,
            format!("Health check {}: {}", check.status, check.name),
            check.message.clone(),
            "health_monitor",
        )
        .with_label("check_name", check.name.clone());
        if let Some(value) = observed_value(kind, check) {
            alert = alert.with_value(value, limit);
        }

        match self.alerts.fire_alert(alert).await {
            Ok(true) => self.trigger_recovery(check),
            Ok(false) => debug!("Alert {} is silenced, skipping recovery", alert_id),
            Err(e) => warn!("Failed to fire alert {}: {}", alert_id, e),
        }
    }

    /// Publish the figures rules can query
    fn export_probe_values(&self, kind: ProbeKind, check: &HealthCheck) {
        let detail = |key: &str| check.details.get(key).and_then(|v| v.as_f64());
        match kind {
            ProbeKind::Memory => {
                if let Some(mb) = detail("resident_mb") {
                    self.metrics.set_resident_memory_mb(mb);
                }
            }
            ProbeKind::Http => {
                if let (Some(rate), Some(p95)) = (detail("error_rate"), detail("p95_seconds")) {
                    let p95 = Duration::try_from_secs_f64(p95).unwrap_or_default();
                    self.metrics.set_http_probe(rate, p95);
                }
            }
            ProbeKind::Database | ProbeKind::Tasks | ProbeKind::Disk => {}
        }
    }

    fn breach_held(&self, name: &str, threshold: &AlertThreshold, now: DateTime<Utc>) -> bool {
        if threshold.min_duration.is_zero() {
            return true;
        }
        let since = *self
            .breach_since
            .write()
            .entry(name.to_string())
            .or_insert(now);
        (now - since).to_std().unwrap_or_default() >= threshold.min_duration
    }

    /// Latest result of every probe, ordered by name
    pub fn get_checks(&self) -> Vec<HealthCheck> {
        let mut checks: Vec<HealthCheck> = self.snapshot.read().values().cloned().collect();
        checks.sort_by(|a, b| a.name.cmp(&b.name));
        checks
    }

    pub fn get_check(&self, name: &str) -> Option<HealthCheck> {
        self.snapshot.read().get(name).cloned()
    }

    /// Worst status across the latest results; healthy before any probe ran
    pub fn get_overall_status(&self) -> HealthState {
        HealthState::worst(self.snapshot.read().values().map(|c| c.status))
    }

    pub fn set_threshold(&self, probe: impl Into<String>, threshold: AlertThreshold) {
        self.thresholds.write().insert(probe.into(), threshold);
    }

    pub fn thresholds(&self) -> HashMap<String, AlertThreshold> {
        self.thresholds.read().clone()
    }

    /// Run `action` whenever the named probe raises an alert
    pub fn register_recovery(&self, probe: impl Into<String>, action: Arc<dyn RecoveryAction>) {
        let probe = probe.into();
        debug!("Registered recovery action {} for {}", action.name(), probe);
        self.recoveries.write().insert(probe, action);
    }

    pub fn has_recovery(&self, probe: &str) -> bool {
        self.recoveries.read().contains_key(probe)
    }
}

/// Numeric reading to attach to a probe alert
fn observed_value(kind: ProbeKind, check: &HealthCheck) -> Option<f64> {
    let key = match kind {
        ProbeKind::Memory => "resident_mb",
        ProbeKind::Tasks => "tasks",
        ProbeKind::Disk => "used_percent",
        ProbeKind::Database | ProbeKind::Http => return None,
    };
    check.details.get(key).and_then(|v| v.as_f64())
}
