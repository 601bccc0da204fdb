//! Validators for the alert system configuration

use super::trait_def::Validate;
use super::urls::validate_http_url;
use crate::config::models::*;
use tracing::debug;

impl Validate for AlertSystemConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating alert system configuration");

        self.alerting.validate()?;
        self.health.validate()?;
        self.notifiers.validate()?;
        self.server.validate()?;

        if let Some(url) = &self.database_url {
            if url.trim().is_empty() {
                return Err("Database URL cannot be empty when set".to_string());
            }
        }

        Ok(())
    }
}

impl Validate for AlertingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.evaluation_interval.is_zero() {
            return Err("Alert evaluation interval must be greater than 0".to_string());
        }
        if self.evaluation_interval > MAX_INTERVAL {
            return Err(format!(
                "Alert evaluation interval must be at most {}s",
                MAX_INTERVAL.as_secs()
            ));
        }
        if self.retention.is_zero() {
            return Err("Alert retention must be greater than 0".to_string());
        }
        if self.retention > MAX_RETENTION {
            return Err(format!(
                "Alert retention must be at most {}s",
                MAX_RETENTION.as_secs()
            ));
        }
        Ok(())
    }
}

impl Validate for HealthMonitorConfig {
    fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("Health check interval must be greater than 0".to_string());
        }
        if self.interval > MAX_INTERVAL {
            return Err(format!(
                "Health check interval must be at most {}s",
                MAX_INTERVAL.as_secs()
            ));
        }
        if self.http_timeout.is_zero() {
            return Err("Health HTTP timeout must be greater than 0".to_string());
        }
        if self.probe_timeout.is_zero() {
            return Err("Health probe timeout must be greater than 0".to_string());
        }
        if self.recovery_timeout.is_zero() {
            return Err("Recovery timeout must be greater than 0".to_string());
        }
        for endpoint in &self.http_endpoints {
            validate_http_url(endpoint, "Health endpoint")?;
        }
        Ok(())
    }
}

impl Validate for NotifierConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(webhook) = &self.webhook {
            webhook.validate()?;
        }
        if let Some(slack) = &self.slack {
            slack.validate()?;
        }
        if let Some(email) = &self.email {
            email.validate()?;
        }
        Ok(())
    }
}

impl Validate for WebhookConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.url, "Webhook")?;
        if self.timeout_secs == 0 {
            return Err("Webhook timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for SlackConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url(&self.webhook_url, "Slack webhook")?;
        if self.timeout_secs == 0 {
            return Err("Slack timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for EmailConfig {
    fn validate(&self) -> Result<(), String> {
        if self.smtp_host.trim().is_empty() {
            return Err("SMTP host cannot be empty".to_string());
        }
        if self.smtp_port == 0 {
            return Err("SMTP port must be greater than 0".to_string());
        }
        if self.from.trim().is_empty() {
            return Err("Email sender cannot be empty".to_string());
        }
        if self.to.is_empty() {
            return Err("Email notifications need at least one recipient".to_string());
        }
        if let Some(bad) = self.to.iter().find(|addr| !addr.contains('@')) {
            return Err(format!("Invalid email recipient: {}", bad));
        }
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Server host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.workers == Some(0) {
            return Err("Worker count must be greater than 0".to_string());
        }
        Ok(())
    }
}
