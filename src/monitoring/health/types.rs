//! Health checking types and data structures

use crate::monitoring::types::AlertType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Classification of a single probe result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    pub const ALL: [HealthState; 3] = [
        HealthState::Healthy,
        HealthState::Degraded,
        HealthState::Unhealthy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unhealthy => "unhealthy",
        }
    }

    /// Value exported by the `health_status` gauge
    pub fn gauge_value(&self) -> f64 {
        match self {
            HealthState::Unhealthy => 0.0,
            HealthState::Degraded => 1.0,
            HealthState::Healthy => 2.0,
        }
    }

    /// Worst-of aggregation: any unhealthy wins, then any degraded
    pub fn worst<I: IntoIterator<Item = HealthState>>(states: I) -> HealthState {
        let mut overall = HealthState::Healthy;
        for state in states {
            match state {
                HealthState::Unhealthy => return HealthState::Unhealthy,
                HealthState::Degraded => overall = HealthState::Degraded,
                HealthState::Healthy => {}
            }
        }
        overall
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time result of one probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Probe name
    pub name: String,
    /// Classification
    pub status: HealthState,
    /// Human readable explanation
    pub message: String,
    /// How long the probe took
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    /// When the probe finished
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Structured probe output
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

impl HealthCheck {
    pub fn new(
        name: impl Into<String>,
        status: HealthState,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration,
            timestamp: chrono::Utc::now(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Per-probe gate deciding whether a classification raises an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThreshold {
    /// Value reported with degraded alerts
    pub warning: f64,
    /// Value reported with unhealthy alerts
    pub critical: f64,
    /// Minimum time a breach should persist
    #[serde(default, with = "duration_millis")]
    pub min_duration: Duration,
    pub enabled: bool,
}

impl AlertThreshold {
    pub fn new(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            min_duration: Duration::ZERO,
            enabled: true,
        }
    }
}

/// The probes run by the health monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    Database,
    Memory,
    Tasks,
    Http,
    Disk,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 5] = [
        ProbeKind::Database,
        ProbeKind::Memory,
        ProbeKind::Tasks,
        ProbeKind::Http,
        ProbeKind::Disk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Database => "database",
            ProbeKind::Memory => "memory",
            ProbeKind::Tasks => "tasks",
            ProbeKind::Http => "http",
            ProbeKind::Disk => "disk",
        }
    }

    pub fn alert_type(&self) -> AlertType {
        match self {
            ProbeKind::Database => AlertType::Database,
            ProbeKind::Memory => AlertType::Memory,
            ProbeKind::Tasks => AlertType::TaskCount,
            ProbeKind::Http => AlertType::Http,
            ProbeKind::Disk => AlertType::Disk,
        }
    }

    pub fn from_name(name: &str) -> Option<ProbeKind> {
        ProbeKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Default thresholds, one enabled entry per probe
pub fn default_thresholds() -> HashMap<String, AlertThreshold> {
    let mut thresholds = HashMap::new();
    thresholds.insert("database".to_string(), AlertThreshold::new(0.0, 0.0));
    thresholds.insert("memory".to_string(), AlertThreshold::new(1024.0, 2048.0));
    thresholds.insert("tasks".to_string(), AlertThreshold::new(1000.0, 10000.0));
    thresholds.insert("http".to_string(), AlertThreshold::new(0.0, 0.0));
    thresholds.insert("disk".to_string(), AlertThreshold::new(85.0, 95.0));
    thresholds
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
