//! Prometheus metrics for alerting and health checking
//!
//! Each [`AlertMetrics`] owns its own registry, so several alert systems can
//! live in one process (tests do this constantly) without colliding.

use crate::monitoring::health::types::{HealthCheck, HealthState};
use crate::monitoring::types::Alert;
use crate::utils::error::Result;
use prometheus::{
    Gauge, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Alert lifecycle action recorded in `alerts_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    Fired,
    Resolved,
    Silenced,
    Suppressed,
}

impl AlertAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertAction::Fired => "fired",
            AlertAction::Resolved => "resolved",
            AlertAction::Silenced => "silenced",
            AlertAction::Suppressed => "suppressed",
        }
    }
}

/// Metric handles shared by the alert manager and health monitor
#[derive(Debug, Clone)]
pub struct AlertMetrics {
    registry: Registry,
    alerts_total: IntCounterVec,
    alert_duration_seconds: HistogramVec,
    notifications_total: IntCounterVec,
    health_checks_total: IntCounterVec,
    health_check_duration_seconds: HistogramVec,
    health_status: GaugeVec,
    process_resident_memory_mb: Gauge,
    http_error_rate: Gauge,
    http_response_time_p95_seconds: Gauge,
}

impl AlertMetrics {
    /// Create metrics in a fresh registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Registry::new())
    }

    /// Create metrics and register them in `registry`
    pub fn with_registry(registry: Registry) -> Result<Self> {
        let alerts_total = IntCounterVec::new(
            Opts::new("alerts_total", "Alert lifecycle transitions"),
            &["type", "severity", "action"],
        )?;
        let alert_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "alert_duration_seconds",
                "Time between an alert starting and being resolved",
            )
            .buckets(vec![
                1.0, 10.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 21600.0, 86400.0,
            ]),
            &["type", "severity"],
        )?;
        let notifications_total = IntCounterVec::new(
            Opts::new("notifications_total", "Notification delivery attempts"),
            &["notifier", "result"],
        )?;
        let health_checks_total = IntCounterVec::new(
            Opts::new("health_checks_total", "Health probe executions"),
            &["check_name", "status"],
        )?;
        let health_check_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "health_check_duration_seconds",
                "Health probe execution time",
            ),
            &["check_name", "status"],
        )?;
        let health_status = GaugeVec::new(
            Opts::new(
                "health_status",
                "Latest probe status (0=unhealthy, 1=degraded, 2=healthy)",
            ),
            &["check_name", "status"],
        )?;

        // Series read by the default rules, fed from probe results
        let process_resident_memory_mb = Gauge::new(
            "process_resident_memory_mb",
            "Resident memory of this process in MB",
        )?;
        let http_error_rate = Gauge::new(
            "http_error_rate",
            "Percentage of probed endpoints not answering 200",
        )?;
        let http_response_time_p95_seconds = Gauge::new(
            "http_response_time_p95_seconds",
            "95th percentile response time of the probed endpoints",
        )?;

        registry.register(Box::new(alerts_total.clone()))?;
        registry.register(Box::new(alert_duration_seconds.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(health_checks_total.clone()))?;
        registry.register(Box::new(health_check_duration_seconds.clone()))?;
        registry.register(Box::new(health_status.clone()))?;
        registry.register(Box::new(process_resident_memory_mb.clone()))?;
        registry.register(Box::new(http_error_rate.clone()))?;
        registry.register(Box::new(http_response_time_p95_seconds.clone()))?;

        Ok(Self {
            registry,
            alerts_total,
            alert_duration_seconds,
            notifications_total,
            health_checks_total,
            health_check_duration_seconds,
            health_status,
            process_resident_memory_mb,
            http_error_rate,
            http_response_time_p95_seconds,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_alert(&self, alert: &Alert, action: AlertAction) {
        self.alerts_total
            .with_label_values(&[
                alert.alert_type.as_str(),
                alert.severity.as_str(),
                action.as_str(),
            ])
            .inc();
    }

    pub fn observe_alert_duration(&self, alert: &Alert, duration: Duration) {
        self.alert_duration_seconds
            .with_label_values(&[alert.alert_type.as_str(), alert.severity.as_str()])
            .observe(duration.as_secs_f64());
    }

    pub fn record_notification(&self, notifier: &str, success: bool) {
        let result = if success { "success" } else { "failure" };
        self.notifications_total
            .with_label_values(&[notifier, result])
            .inc();
    }

    /// Record one probe execution
    ///
    /// The status gauge keeps one series per check; the previous status series
    /// for the same check is removed so only the latest status is exported.
    pub fn record_health_check(&self, check: &HealthCheck) {
        let status = check.status.as_str();
        self.health_checks_total
            .with_label_values(&[check.name.as_str(), status])
            .inc();
        self.health_check_duration_seconds
            .with_label_values(&[check.name.as_str(), status])
            .observe(check.duration.as_secs_f64());

        for other in HealthState::ALL {
            if other != check.status {
                let _ = self
                    .health_status
                    .remove_label_values(&[check.name.as_str(), other.as_str()]);
            }
        }
        self.health_status
            .with_label_values(&[check.name.as_str(), status])
            .set(check.status.gauge_value());
    }

    pub fn set_resident_memory_mb(&self, mb: f64) {
        self.process_resident_memory_mb.set(mb);
    }

    pub fn set_http_probe(&self, error_rate: f64, p95: Duration) {
        self.http_error_rate.set(error_rate);
        self.http_response_time_p95_seconds.set(p95.as_secs_f64());
    }

    /// Current alert counter value for one label combination
    pub fn alert_count(&self, alert: &Alert, action: AlertAction) -> u64 {
        self.alerts_total
            .with_label_values(&[
                alert.alert_type.as_str(),
                alert.severity.as_str(),
                action.as_str(),
            ])
            .get()
    }

    /// Render every registered metric in the text exposition format
    pub fn render(&self) -> Result<String> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{AlertSeverity, AlertType};
    use std::collections::HashMap;

    fn check(status: HealthState) -> HealthCheck {
        HealthCheck {
            name: "database".to_string(),
            status,
            message: "ok".to_string(),
            duration: Duration::from_millis(12),
            timestamp: chrono::Utc::now(),
            details: HashMap::new(),
        }
    }

    #[test]
    fn test_separate_instances_do_not_collide() {
        assert!(AlertMetrics::new().is_ok());
        assert!(AlertMetrics::new().is_ok());
    }

    #[test]
    fn test_alert_counters() {
        let metrics = AlertMetrics::new().unwrap();
        let alert = Alert::new(
            "a",
            AlertType::Database,
            AlertSeverity::Critical,
            "t",
            "d",
            "test",
        );
        metrics.record_alert(&alert, AlertAction::Fired);
        metrics.record_alert(&alert, AlertAction::Fired);
        metrics.record_alert(&alert, AlertAction::Resolved);

        assert_eq!(metrics.alert_count(&alert, AlertAction::Fired), 2);
        assert_eq!(metrics.alert_count(&alert, AlertAction::Resolved), 1);

        let text = metrics.render().unwrap();
        assert!(text.contains("alerts_total"));
        assert!(text.contains("action=\"fired\""));
    }

    #[test]
    fn test_health_status_gauge_tracks_latest_status() {
        let metrics = AlertMetrics::new().unwrap();
        metrics.record_health_check(&check(HealthState::Unhealthy));
        metrics.record_health_check(&check(HealthState::Healthy));

        let text = metrics.render().unwrap();
        assert!(text.contains("health_status{check_name=\"database\",status=\"healthy\"} 2"));
        assert!(!text.contains("health_status{check_name=\"database\",status=\"unhealthy\"}"));
        assert!(text.contains("health_checks_total{check_name=\"database\",status=\"unhealthy\"} 1"));
    }
}
