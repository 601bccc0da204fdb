//! Type definitions for alerts and alert queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fault category an alert belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    System,
    Database,
    Memory,
    TaskCount,
    Http,
    Disk,
    Performance,
    Security,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::System => "system",
            AlertType::Database => "database",
            AlertType::Memory => "memory",
            AlertType::TaskCount => "task_count",
            AlertType::Http => "http",
            AlertType::Disk => "disk",
            AlertType::Performance => "performance",
            AlertType::Security => "security",
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "system" => Ok(AlertType::System),
            "database" => Ok(AlertType::Database),
            "memory" => Ok(AlertType::Memory),
            "task_count" => Ok(AlertType::TaskCount),
            "http" => Ok(AlertType::Http),
            "disk" => Ok(AlertType::Disk),
            "performance" => Ok(AlertType::Performance),
            "security" => Ok(AlertType::Security),
            other => Err(format!("unknown alert type: {}", other)),
        }
    }
}

/// Alert severity levels, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Error => "error",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(AlertSeverity::Info),
            "warning" => Ok(AlertSeverity::Warning),
            "error" => Ok(AlertSeverity::Error),
            "critical" => Ok(AlertSeverity::Critical),
            other => Err(format!("unknown alert severity: {}", other)),
        }
    }
}

/// Lifecycle status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
    Silenced,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Silenced => "silenced",
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "firing" => Ok(AlertStatus::Firing),
            "resolved" => Ok(AlertStatus::Resolved),
            "silenced" => Ok(AlertStatus::Silenced),
            other => Err(format!("unknown alert status: {}", other)),
        }
    }
}

/// Alert information
///
/// `ends_at` is set exactly when `status` is [`AlertStatus::Resolved`]; the
/// manager maintains this on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert ID
    pub id: String,
    /// Fault category
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Alert title
    pub title: String,
    /// Alert description
    pub description: String,
    /// Component that raised the alert
    pub source: String,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
    /// When the condition started
    pub starts_at: DateTime<Utc>,
    /// When the alert was resolved
    pub ends_at: Option<DateTime<Utc>>,
    /// Lifecycle status
    pub status: AlertStatus,
    /// Observed value that triggered the alert
    pub value: Option<f64>,
    /// Threshold the value was compared against
    pub threshold: Option<f64>,
    /// Identifying labels
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Free-form annotations
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

impl Alert {
    /// Create a new firing alert stamped with the current time
    pub fn new(
        id: impl Into<String>,
        alert_type: AlertType,
        severity: AlertSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            alert_type,
            severity,
            title: title.into(),
            description: description.into(),
            source: source.into(),
            created_at: now,
            starts_at: now,
            ends_at: None,
            status: AlertStatus::Firing,
            value: None,
            threshold: None,
            labels: HashMap::new(),
            annotations: HashMap::new(),
        }
    }

    /// Attach the triggering value and threshold
    pub fn with_value(mut self, value: f64, threshold: f64) -> Self {
        self.value = Some(value);
        self.threshold = Some(threshold);
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Whether the alert is still live (firing or silenced)
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status != AlertStatus::Resolved
    }
}

/// Equality filter over alerts; every `Some` field must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<AlertSeverity>,
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
    pub source: Option<String>,
}

impl AlertFilter {
    pub fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_type(mut self, alert_type: AlertType) -> Self {
        self.alert_type = Some(alert_type);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.is_none_or(|s| s == alert.status)
            && self.severity.is_none_or(|s| s == alert.severity)
            && self.alert_type.is_none_or(|t| t == alert.alert_type)
            && self.source.as_deref().is_none_or(|s| s == alert.source)
    }
}
