//! AlertSystem: wires the store, manager, notifiers and health monitor together

use crate::config::AlertSystemConfig;
use crate::utils::error::{Result, WatchError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::alerts::{
    AlertManager, AlertRule, ComparisonOperator, MetricValueSource, RegistryValueSource,
    build_notifiers, create_store,
};
use super::health::{
    DatabaseHandle, DatabaseRecovery, HealthCheck, HealthMonitor, HealthState, ProcessSampler,
    RuntimeSampler,
};
use super::metrics::AlertMetrics;
use super::shutdown::ShutdownSignal;
use super::types::{Alert, AlertFilter, AlertSeverity, AlertType};

/// One alerting and health-monitoring stack
///
/// Construct one per process and hand clones (or an `Arc`) to whatever needs
/// it; there is no global instance.
#[derive(Debug, Clone)]
pub struct AlertSystem {
    config: Arc<AlertSystemConfig>,
    manager: AlertManager,
    monitor: HealthMonitor,
    metrics: AlertMetrics,
    db: Option<Arc<dyn DatabaseHandle>>,
}

impl AlertSystem {
    /// Create an alert system with its own metrics registry
    pub fn new(
        config: AlertSystemConfig,
        db: Option<Arc<dyn DatabaseHandle>>,
        values: Arc<dyn MetricValueSource>,
    ) -> Result<Self> {
        Self::with_parts(
            config,
            db,
            values,
            AlertMetrics::new()?,
            Arc::new(ProcessSampler::new()),
        )
    }

    /// Create an alert system whose rules read from the registry its own
    /// metrics are exported to
    pub fn with_registry(
        config: AlertSystemConfig,
        db: Option<Arc<dyn DatabaseHandle>>,
        registry: prometheus::Registry,
        sampler: Arc<dyn RuntimeSampler>,
    ) -> Result<Self> {
        let metrics = AlertMetrics::with_registry(registry.clone())?;
        Self::with_parts(
            config,
            db,
            Arc::new(RegistryValueSource::new(registry)),
            metrics,
            sampler,
        )
    }

    /// Create an alert system from explicit metrics and runtime sampler
    pub fn with_parts(
        config: AlertSystemConfig,
        db: Option<Arc<dyn DatabaseHandle>>,
        values: Arc<dyn MetricValueSource>,
        metrics: AlertMetrics,
        sampler: Arc<dyn RuntimeSampler>,
    ) -> Result<Self> {
        info!(
            "Creating alert system (store backend: {})",
            config.alerting.store_backend
        );

        let store = create_store(&config.alerting.store_backend);
        let notifiers = build_notifiers(&config.notifiers)?;
        debug!(
            "Configured notifiers: {}",
            notifiers
                .iter()
                .map(|n| n.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let manager = AlertManager::new(
            config.alerting.clone(),
            store,
            notifiers,
            values,
            metrics.clone(),
        );
        let monitor = HealthMonitor::new(
            config.health.clone(),
            manager.clone(),
            metrics.clone(),
            db.clone(),
            sampler,
        )?;

        Ok(Self {
            config: Arc::new(config),
            manager,
            monitor,
            metrics,
            db,
        })
    }

    /// Install the default rule set and recovery actions
    ///
    /// Safe to call more than once: rules that already exist are left alone.
    pub async fn initialize(&self) -> Result<()> {
        if self.config.alerting.enable_default_rules {
            let mut installed = 0;
            for rule in default_rules() {
                match self.manager.get_rule(&rule.id).await {
                    Ok(_) => continue,
                    Err(e) if e.is_not_found() => {
                        self.manager.add_rule(rule).await?;
                        installed += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
            debug!("Installed {} default alert rules", installed);
        }

        if let Some(db) = &self.db {
            self.monitor
                .register_recovery("database", Arc::new(DatabaseRecovery::new(db.clone())));
        }

        info!("Alert system initialized");
        Ok(())
    }

    /// Start the alert manager and, when enabled, the health monitor
    pub async fn start(&self, signal: ShutdownSignal) -> Result<()> {
        self.manager.start(signal.clone()).await?;

        if self.config.health.enabled {
            if let Err(e) = self.monitor.start(signal).await {
                self.manager.stop().await?;
                return Err(e);
            }
        } else {
            info!("Health monitor disabled");
        }

        info!("Alert system started");
        Ok(())
    }

    /// Stop every running component
    pub async fn stop(&self) -> Result<()> {
        self.manager.stop().await?;
        if self.monitor.is_running() {
            self.monitor.stop().await?;
        }
        info!("Alert system stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.manager.is_running()
    }

    pub fn config(&self) -> &AlertSystemConfig {
        &self.config
    }

    pub fn manager(&self) -> &AlertManager {
        &self.manager
    }

    pub fn monitor(&self) -> &HealthMonitor {
        &self.monitor
    }

    pub fn metrics(&self) -> &AlertMetrics {
        &self.metrics
    }

    // ==================== Alerts ====================

    pub async fn alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.manager.get_alerts(filter).await
    }

    pub async fn active_alerts(&self) -> Vec<Alert> {
        self.manager.get_active_alerts().await
    }

    pub async fn alert(&self, id: &str) -> Result<Alert> {
        self.manager.get_alert(id).await
    }

    /// Fire an alert; `false` when a silence dropped it
    pub async fn fire_alert(&self, alert: Alert) -> Result<bool> {
        self.manager.fire_alert(alert).await
    }

    pub async fn resolve_alert(&self, id: &str) -> Result<Alert> {
        self.manager.resolve_alert(id).await
    }

    pub async fn silence_alert(&self, id: &str, duration: Duration) -> Result<Alert> {
        if duration.is_zero() {
            return Err(WatchError::validation("Silence duration must be greater than 0"));
        }
        self.manager.silence_alert(id, duration).await
    }

    // ==================== Rules ====================

    pub async fn rules(&self) -> Vec<AlertRule> {
        self.manager.get_rules().await
    }

    pub async fn rule(&self, id: &str) -> Result<AlertRule> {
        self.manager.get_rule(id).await
    }

    pub async fn add_rule(&self, rule: AlertRule) -> Result<AlertRule> {
        self.manager.add_rule(rule).await
    }

    pub async fn update_rule(&self, rule: AlertRule) -> Result<AlertRule> {
        self.manager.update_rule(rule).await
    }

    pub async fn remove_rule(&self, id: &str) -> Result<()> {
        self.manager.remove_rule(id).await
    }

    // ==================== Health ====================

    /// Latest result per probe
    pub fn health_checks(&self) -> Vec<HealthCheck> {
        self.monitor.get_checks()
    }

    pub fn health_check(&self, name: &str) -> Option<HealthCheck> {
        self.monitor.get_check(name)
    }

    pub fn overall_status(&self) -> HealthState {
        self.monitor.get_overall_status()
    }

    /// Run every probe now instead of waiting for the next tick
    pub async fn check_now(&self) -> Vec<HealthCheck> {
        self.monitor.check_all().await
    }

    /// Prometheus text exposition of the alerting metrics
    pub fn metrics_text(&self) -> Result<String> {
        self.metrics.render()
    }
}

/// Rules installed by [`AlertSystem::initialize`]
pub fn default_rules() -> Vec<AlertRule> {
    vec![
        AlertRule::new(
            "high_error_rate",
            "High error rate",
            AlertType::Performance,
            AlertSeverity::Error,
            "http_error_rate",
            ComparisonOperator::GreaterThan,
            5.0,
        ),
        AlertRule::new(
            "slow_responses",
            "Slow responses",
            AlertType::Performance,
            AlertSeverity::Warning,
            "http_response_time_p95_seconds",
            ComparisonOperator::GreaterThan,
            2.0,
        ),
        AlertRule::new(
            "db_connections_saturated",
            "Database connections saturated",
            AlertType::Database,
            AlertSeverity::Warning,
            "db_connections_in_use",
            ComparisonOperator::GreaterThan,
            80.0,
        ),
        AlertRule::new(
            "process_memory_high",
            "Process memory high",
            AlertType::Memory,
            AlertSeverity::Critical,
            "process_resident_memory_mb",
            ComparisonOperator::GreaterThan,
            2048.0,
        ),
    ]
}
