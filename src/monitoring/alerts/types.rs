//! Alert rule types and the threshold condition evaluator

use crate::monitoring::types::{AlertSeverity, AlertType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Comparison operators for alert rules
///
/// Operators are carried as their textual form (`">"`, `">="`, ...). Any other
/// spelling deserializes into [`ComparisonOperator::Unsupported`], which never
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    Unsupported(String),
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::Unsupported(raw) => raw,
        }
    }
}

impl From<String> for ComparisonOperator {
    fn from(raw: String) -> Self {
        match raw.trim() {
            ">" => ComparisonOperator::GreaterThan,
            ">=" => ComparisonOperator::GreaterThanOrEqual,
            "<" => ComparisonOperator::LessThan,
            "<=" => ComparisonOperator::LessThanOrEqual,
            "==" => ComparisonOperator::Equal,
            "!=" => ComparisonOperator::NotEqual,
            _ => ComparisonOperator::Unsupported(raw),
        }
    }
}

impl From<&str> for ComparisonOperator {
    fn from(raw: &str) -> Self {
        ComparisonOperator::from(raw.to_string())
    }
}

impl From<ComparisonOperator> for String {
    fn from(op: ComparisonOperator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold comparison applied to a single metric value
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCondition {
    pub operator: ComparisonOperator,
    pub threshold: f64,
}

impl AlertCondition {
    pub fn new(operator: ComparisonOperator, threshold: f64) -> Self {
        Self {
            operator,
            threshold,
        }
    }

    /// Compare `value` against the threshold. Unsupported operators yield `false`.
    pub fn evaluate(&self, value: f64) -> bool {
        match &self.operator {
            ComparisonOperator::GreaterThan => value > self.threshold,
            ComparisonOperator::GreaterThanOrEqual => value >= self.threshold,
            ComparisonOperator::LessThan => value < self.threshold,
            ComparisonOperator::LessThanOrEqual => value <= self.threshold,
            ComparisonOperator::Equal => value == self.threshold,
            ComparisonOperator::NotEqual => value != self.threshold,
            ComparisonOperator::Unsupported(_) => false,
        }
    }
}

/// Standing threshold rule evaluated against a named metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Rule ID
    #[serde(default)]
    pub id: String,
    /// Rule name
    pub name: String,
    /// Fault category of alerts raised by this rule
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Severity of alerts raised by this rule
    pub severity: AlertSeverity,
    /// Metric series name resolved by the value source
    pub query: String,
    /// Threshold value
    pub threshold: f64,
    /// Comparison operator
    pub operator: ComparisonOperator,
    /// How long the condition must hold before firing
    #[serde(default, with = "duration_secs")]
    pub duration: Duration,
    /// Whether the rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl AlertRule {
    /// Create an enabled rule that fires on the first breach
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        alert_type: AlertType,
        severity: AlertSeverity,
        query: impl Into<String>,
        operator: ComparisonOperator,
        threshold: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            alert_type,
            severity,
            query: query.into(),
            threshold,
            operator,
            duration: Duration::ZERO,
            enabled: true,
            labels: HashMap::new(),
            annotations: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn condition(&self) -> AlertCondition {
        AlertCondition::new(self.operator.clone(), self.threshold)
    }

    /// The single alert id this rule can raise
    pub fn alert_id(&self) -> String {
        format!("{}_{}", self.id, self.alert_type)
    }

    /// Check the fields a rule cannot work without
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Rule name cannot be empty".to_string());
        }
        if self.query.trim().is_empty() {
            return Err("Rule query cannot be empty".to_string());
        }
        if !self.threshold.is_finite() {
            return Err("Rule threshold must be a finite number".to_string());
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
