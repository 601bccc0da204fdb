//! Alert manager configuration

use super::*;
use serde::{Deserialize, Serialize};
use crate::utils::error::WatchError;
use std::time::Duration;

/// Alert store implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory, lost on restart
    #[default]
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in-memory" | "in_memory" => Ok(StoreBackend::Memory),
            other => Err(WatchError::config(format!(
                "Unknown alert store backend: {}",
                other
            ))),
        }
    }
}

/// Alert manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Time between rule evaluations
    #[serde(
        default = "default_evaluation_interval",
        with = "duration_secs",
        rename = "evaluation_interval_secs"
    )]
    pub evaluation_interval: Duration,
    /// How long resolved alerts are kept
    #[serde(
        default = "default_retention",
        with = "duration_secs",
        rename = "retention_secs"
    )]
    pub retention: Duration,
    /// Send fired alerts to notifiers
    #[serde(default = "default_true")]
    pub enable_notifications: bool,
    /// Install the built-in rule set on initialization
    #[serde(default = "default_true")]
    pub enable_default_rules: bool,
    /// Alert store implementation
    #[serde(default)]
    pub store_backend: StoreBackend,
}

fn default_evaluation_interval() -> Duration {
    Duration::from_secs(default_evaluation_interval_secs())
}

fn default_retention() -> Duration {
    Duration::from_secs(default_retention_secs())
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            evaluation_interval: default_evaluation_interval(),
            retention: default_retention(),
            enable_notifications: true,
            enable_default_rules: true,
            store_backend: StoreBackend::default(),
        }
    }
}
