//! Health monitor configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMonitorConfig {
    /// Run the health monitor at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Time between probe passes
    #[serde(
        default = "default_interval",
        with = "duration_secs",
        rename = "interval_secs"
    )]
    pub interval: Duration,
    /// Run recovery actions when a probe raises an alert
    #[serde(default = "default_true")]
    pub auto_recovery: bool,
    /// Liveness URLs for the http probe
    #[serde(default = "default_http_endpoints")]
    pub http_endpoints: Vec<String>,
    /// Per-request timeout of the http probe
    #[serde(
        default = "default_probe_timeout",
        with = "duration_secs",
        rename = "http_timeout_secs"
    )]
    pub http_timeout: Duration,
    /// Timeout for each database ping and query
    #[serde(
        default = "default_probe_timeout",
        with = "duration_secs",
        rename = "probe_timeout_secs"
    )]
    pub probe_timeout: Duration,
    /// Upper bound for one recovery action
    #[serde(
        default = "default_recovery_timeout",
        with = "duration_secs",
        rename = "recovery_timeout_secs"
    )]
    pub recovery_timeout: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(default_health_check_interval_secs())
}

fn default_probe_timeout() -> Duration {
    Duration::from_secs(default_probe_timeout_secs())
}

fn default_recovery_timeout() -> Duration {
    Duration::from_secs(default_recovery_timeout_secs())
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: default_interval(),
            auto_recovery: true,
            http_endpoints: default_http_endpoints(),
            http_timeout: default_probe_timeout(),
            probe_timeout: default_probe_timeout(),
            recovery_timeout: default_recovery_timeout(),
        }
    }
}
