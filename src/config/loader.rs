//! Configuration loading from YAML files and environment variables

use super::models::*;
use super::validation::Validate;
use crate::utils::error::{Result, WatchError};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

impl AlertSystemConfig {
    /// Defaults, then the optional YAML file, then environment overrides
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::read_file(path).await?,
            None => Self::default(),
        };
        let config = config.apply_env(|key| std::env::var(key).ok())?;
        config.validated()
    }

    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_file(path.as_ref()).await?.validated()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration from defaults plus variables resolved by `lookup`
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_env(lookup)?.validated()
    }

    async fn read_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WatchError::config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| WatchError::config(format!("Failed to parse config: {}", e)))
    }

    fn validated(self) -> Result<Self> {
        Validate::validate(&self).map_err(WatchError::config)?;
        debug!("Configuration loaded successfully");
        Ok(self)
    }

    /// Override fields with the variables `lookup` knows about
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Alerting
        if let Some(v) = var("ALERT_EVALUATION_INTERVAL_SECS") {
            self.alerting.evaluation_interval = parse_secs("ALERT_EVALUATION_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("ALERT_RETENTION_SECS") {
            self.alerting.retention = parse_secs("ALERT_RETENTION_SECS", &v)?;
        }
        if let Some(v) = var("ENABLE_NOTIFICATIONS") {
            self.alerting.enable_notifications = parse_bool("ENABLE_NOTIFICATIONS", &v)?;
        }
        if let Some(v) = var("ENABLE_DEFAULT_RULES") {
            self.alerting.enable_default_rules = parse_bool("ENABLE_DEFAULT_RULES", &v)?;
        }
        if let Some(v) = var("ALERT_STORE_BACKEND") {
            self.alerting.store_backend = StoreBackend::from_str(&v)?;
        }

        // Health monitor
        if let Some(v) = var("HEALTH_CHECK_INTERVAL_SECS") {
            self.health.interval = parse_secs("HEALTH_CHECK_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = var("ENABLE_HEALTH_MONITOR") {
            self.health.enabled = parse_bool("ENABLE_HEALTH_MONITOR", &v)?;
        }
        if let Some(v) = var("ENABLE_AUTO_RECOVERY") {
            self.health.auto_recovery = parse_bool("ENABLE_AUTO_RECOVERY", &v)?;
        }
        if let Some(v) = var("HEALTH_HTTP_ENDPOINTS") {
            self.health.http_endpoints = parse_list(&v);
        }

        // Webhook
        if let Some(url) = var("WEBHOOK_URL") {
            let webhook = self
                .notifiers
                .webhook
                .get_or_insert_with(|| WebhookConfig::new(url.clone()));
            webhook.url = url;
        }
        if let (Some(webhook), Some(v)) = (self.notifiers.webhook.as_mut(), var("WEBHOOK_TIMEOUT_SECS")) {
            webhook.timeout_secs = parse_num("WEBHOOK_TIMEOUT_SECS", &v)?;
        }

        // Slack
        if let Some(url) = var("SLACK_WEBHOOK_URL") {
            let slack = self
                .notifiers
                .slack
                .get_or_insert_with(|| SlackConfig::new(url.clone()));
            slack.webhook_url = url;
        }
        if let Some(slack) = self.notifiers.slack.as_mut() {
            if let Some(channel) = var("SLACK_CHANNEL") {
                slack.channel = Some(channel);
            }
            if let Some(username) = var("SLACK_USERNAME") {
                slack.username = Some(username);
            }
        }

        // Email
        if let Some(host) = var("SMTP_HOST") {
            let email = self
                .notifiers
                .email
                .get_or_insert_with(|| EmailConfig::new(host.clone()));
            email.smtp_host = host;
        }
        if let Some(email) = self.notifiers.email.as_mut() {
            if let Some(v) = var("SMTP_PORT") {
                email.smtp_port = parse_num("SMTP_PORT", &v)?;
            }
            if let Some(v) = var("SMTP_USERNAME") {
                email.username = v;
            }
            if let Some(v) = var("SMTP_PASSWORD") {
                email.password = v;
            }
            if let Some(v) = var("SMTP_FROM") {
                email.from = v;
            }
            if let Some(v) = var("SMTP_TO") {
                email.to = parse_list(&v);
            }
        }

        // Server
        if let Some(v) = var("API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("API_PORT") {
            self.server.port = parse_num("API_PORT", &v)?;
        }

        if let Some(v) = var("DATABASE_URL") {
            self.database_url = Some(v);
        }

        Ok(self)
    }
}

fn parse_num<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| WatchError::config(format!("Invalid {}: {}", key, e)))
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    parse_num::<u64>(key, value).map(Duration::from_secs)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(WatchError::config(format!(
            "Invalid {}: expected a boolean, got {}",
            key, other
        ))),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
