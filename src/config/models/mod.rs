//! Configuration data models
//!
//! This module defines all configuration structures used by the alert system.

#![allow(missing_docs)]

pub mod alerting;
pub mod health;
pub mod notifier;
pub mod server;

pub use alerting::*;
pub use health::*;
pub use notifier::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Top-level configuration for one alert system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSystemConfig {
    /// Alert manager settings
    #[serde(default)]
    pub alerting: AlertingConfig,
    /// Health monitor settings
    #[serde(default)]
    pub health: HealthMonitorConfig,
    /// Notification channels
    #[serde(default)]
    pub notifiers: NotifierConfig,
    /// HTTP management API
    #[serde(default)]
    pub server: ServerConfig,
    /// Database probed by the health monitor
    #[serde(default)]
    pub database_url: Option<String>,
}

/// Longest accepted evaluation or health check interval
pub const MAX_INTERVAL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Longest accepted retention for resolved alerts
pub const MAX_RETENTION: std::time::Duration =
    std::time::Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Default values for configuration
pub fn default_true() -> bool {
    true
}

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    9090
}

pub fn default_evaluation_interval_secs() -> u64 {
    30
}

pub fn default_health_check_interval_secs() -> u64 {
    30
}

pub fn default_retention_secs() -> u64 {
    24 * 60 * 60
}

pub fn default_notifier_timeout_secs() -> u64 {
    10
}

pub fn default_probe_timeout_secs() -> u64 {
    5
}

pub fn default_recovery_timeout_secs() -> u64 {
    30
}

pub fn default_smtp_port() -> u16 {
    587
}

pub fn default_source() -> String {
    "tourney-watch".to_string()
}

pub fn default_http_endpoints() -> Vec<String> {
    vec!["http://127.0.0.1:9090/livez".to_string()]
}

/// Serde adapter storing a [`std::time::Duration`] as whole seconds
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
