//! Test fixtures and data factories

use std::sync::Arc;
use std::time::Duration;
use tourney_watch::monitoring::health::{FixedSampler, RuntimeSample};
use tourney_watch::{
    Alert, AlertMetrics, AlertRule, AlertSeverity, AlertSystem, AlertSystemConfig, AlertType,
    ComparisonOperator, DatabaseHandle, StaticValueSource,
};

/// Factory for alerts
pub struct AlertFactory;

impl AlertFactory {
    /// A firing system alert with the given id
    pub fn firing(id: &str) -> Alert {
        Self::with_severity(id, AlertSeverity::Warning)
    }

    pub fn with_severity(id: &str, severity: AlertSeverity) -> Alert {
        Alert::new(
            id,
            AlertType::System,
            severity,
            format!("Test alert {}", id),
            "raised by an integration test",
            "integration_test",
        )
    }
}

/// Factory for alert rules
pub struct RuleFactory;

impl RuleFactory {
    /// `http_error_rate > 5.0`, error severity, performance type
    pub fn error_rate(id: &str) -> AlertRule {
        AlertRule::new(
            id,
            "High error rate",
            AlertType::Performance,
            AlertSeverity::Error,
            "http_error_rate",
            ComparisonOperator::GreaterThan,
            5.0,
        )
    }
}

/// An alert system with controllable inputs
pub struct SystemFixture {
    pub system: AlertSystem,
    pub values: Arc<StaticValueSource>,
    pub sampler: Arc<FixedSampler>,
}

impl SystemFixture {
    /// Configuration that never reaches out to the network and ticks rarely
    pub fn config() -> AlertSystemConfig {
        let mut config = AlertSystemConfig::default();
        config.health.http_endpoints.clear();
        config.health.interval = Duration::from_secs(3600);
        config.alerting.evaluation_interval = Duration::from_secs(3600);
        config.alerting.enable_default_rules = false;
        config
    }

    pub fn new(db: Option<Arc<dyn DatabaseHandle>>) -> Self {
        Self::with_config(Self::config(), db)
    }

    pub fn with_config(config: AlertSystemConfig, db: Option<Arc<dyn DatabaseHandle>>) -> Self {
        let values = Arc::new(StaticValueSource::new(0.0));
        let sampler = Arc::new(FixedSampler::new(Self::quiet_sample(), Vec::new()));
        let system = AlertSystem::with_parts(
            config,
            db,
            values.clone(),
            AlertMetrics::new().expect("metrics"),
            sampler.clone(),
        )
        .expect("alert system");

        Self {
            system,
            values,
            sampler,
        }
    }

    /// A small, healthy process
    pub fn quiet_sample() -> RuntimeSample {
        RuntimeSample {
            resident_bytes: 100 * 1024 * 1024,
            virtual_bytes: 1024 * 1024 * 1024,
            tasks: 20,
            workers: 4,
        }
    }
}
