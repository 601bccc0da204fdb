//! Notification channel configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Notification channels; the log channel is always on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// Generic JSON webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Endpoint receiving the POST
    pub url: String,
    /// Extra request headers
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request timeout in seconds
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
    /// Value of the `source` field in the payload
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout_secs: default_notifier_timeout_secs(),
            source: default_source(),
            enabled: true,
        }
    }
}

/// Slack incoming webhook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
    /// Channel override
    #[serde(default)]
    pub channel: Option<String>,
    /// Bot username override
    #[serde(default)]
    pub username: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_notifier_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl SlackConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            channel: None,
            username: None,
            timeout_secs: default_notifier_timeout_secs(),
            enabled: true,
        }
    }
}

/// SMTP settings for email notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub from: String,
    /// Recipients
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl EmailConfig {
    pub fn new(smtp_host: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: Vec::new(),
            enabled: true,
        }
    }
}
