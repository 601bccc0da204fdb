//! Notification channel implementations

use crate::config::{EmailConfig, NotifierConfig, SlackConfig, WebhookConfig};
use crate::monitoring::types::{Alert, AlertSeverity, AlertStatus};
use crate::utils::error::{Result, WatchError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error, info, warn};

/// Notification channel
///
/// Implementations must not change the alert. A disabled notifier returns
/// `Ok(())` without doing anything; a failed delivery returns an error.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Deliver one alert
    async fn notify(&self, alert: &Alert) -> Result<()>;

    /// Get channel name
    fn name(&self) -> &str;

    /// Whether the channel is switched on
    fn is_enabled(&self) -> bool;
}

/// Build the notifiers configured for this process
///
/// The log notifier is always present; the others are added when their
/// section is configured.
pub fn build_notifiers(config: &NotifierConfig) -> Result<Vec<Arc<dyn Notifier>>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(LogNotifier::new())];

    if let Some(webhook) = &config.webhook {
        notifiers.push(Arc::new(WebhookNotifier::new(webhook.clone())?));
    }
    if let Some(slack) = &config.slack {
        notifiers.push(Arc::new(SlackNotifier::new(slack.clone())?));
    }
    if let Some(email) = &config.email {
        notifiers.push(Arc::new(EmailNotifier::new(email.clone())));
    }

    Ok(notifiers)
}

/// Writes alerts to the tracing log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }

    /// Log level used for each severity
    pub fn level_for(severity: AlertSeverity) -> Level {
        match severity {
            AlertSeverity::Critical | AlertSeverity::Error => Level::ERROR,
            AlertSeverity::Warning => Level::WARN,
            AlertSeverity::Info => Level::INFO,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let level = Self::level_for(alert.severity);
        if level == Level::ERROR {
            error!(alert_id = %alert.id, severity = %alert.severity, source = %alert.source, "ALERT: {} - {}", alert.title, alert.description);
        } else if level == Level::WARN {
            warn!(alert_id = %alert.id, severity = %alert.severity, source = %alert.source, "ALERT: {} - {}", alert.title, alert.description);
        } else if level == Level::INFO {
            info!(alert_id = %alert.id, severity = %alert.severity, source = %alert.source, "ALERT: {} - {}", alert.title, alert.description);
        } else {
            debug!(alert_id = %alert.id, severity = %alert.severity, source = %alert.source, "ALERT: {} - {}", alert.title, alert.description);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

/// Posts alerts as JSON to an HTTP endpoint
#[derive(Debug)]
pub struct WebhookNotifier {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| WatchError::config(format!("Invalid webhook header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| WatchError::config(format!("Invalid webhook header value: {}", e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| WatchError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn payload(&self, alert: &Alert) -> serde_json::Value {
        serde_json::json!({
            "alert": alert,
            "timestamp": chrono::Utc::now(),
            "source": self.config.source,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.config.url)
            .json(&self.payload(alert))
            .send()
            .await
            .map_err(|e| WatchError::delivery(format!("Failed to send webhook: {}", e)))?;

        if !response.status().is_success() {
            return Err(WatchError::delivery(format!(
                "Webhook returned status: {}",
                response.status()
            )));
        }

        debug!("Alert {} delivered to webhook", alert.id);
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Slack notification channel
#[derive(Debug)]
pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WatchError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Attachment color; alerts that are no longer firing are grey
    pub fn color_for(alert: &Alert) -> &'static str {
        if alert.status != AlertStatus::Firing {
            return "#808080";
        }
        match alert.severity {
            AlertSeverity::Critical | AlertSeverity::Error => "#ff0000", // Red
            AlertSeverity::Warning => "#ff9500",                          // Amber
            AlertSeverity::Info => "#36a64f",                             // Green
        }
    }

    pub fn payload(&self, alert: &Alert) -> serde_json::Value {
        let mut fields = vec![
            serde_json::json!({"title": "Severity", "value": alert.severity.as_str(), "short": true}),
            serde_json::json!({"title": "Type", "value": alert.alert_type.as_str(), "short": true}),
            serde_json::json!({"title": "Source", "value": alert.source, "short": true}),
            serde_json::json!({"title": "Status", "value": alert.status.as_str(), "short": true}),
        ];
        if let (Some(value), Some(threshold)) = (alert.value, alert.threshold) {
            fields.push(serde_json::json!({
                "title": "Value",
                "value": format!("{} (threshold {})", value, threshold),
                "short": false
            }));
        }

        serde_json::json!({
            "username": self.config.username.as_deref().unwrap_or("Tourney Watch"),
            "channel": self.config.channel,
            "text": format!("[{}] {}", alert.severity.as_str().to_uppercase(), alert.title),
            "attachments": [{
                "color": Self::color_for(alert),
                "title": alert.title,
                "text": alert.description,
                "fields": fields,
                "footer": "Tourney Watch",
                "ts": alert.starts_at.timestamp()
            }]
        })
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&self.payload(alert))
            .send()
            .await
            .map_err(|e| WatchError::delivery(format!("Failed to send Slack notification: {}", e)))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(WatchError::delivery(format!(
                "Slack webhook returned status: {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "slack"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Email notification channel
///
/// Logs the message it would send; SMTP delivery is not wired in yet.
#[derive(Debug)]
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn subject(alert: &Alert) -> String {
        format!("[{}] {}", alert.severity.as_str().to_uppercase(), alert.title)
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        if self.config.to.is_empty() {
            return Err(WatchError::delivery("Email notifier has no recipients"));
        }

        info!(
            smtp_host = %self.config.smtp_host,
            smtp_port = self.config.smtp_port,
            from = %self.config.from,
            to = %self.config.to.join(","),
            "Email notification: {}",
            Self::subject(alert)
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::AlertType;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_alert(severity: AlertSeverity) -> Alert {
        Alert::new(
            "health_database",
            AlertType::Database,
            severity,
            "Health check failed: database",
            "database handle is not configured",
            "health_monitor",
        )
    }

    fn webhook_config(url: String) -> WebhookConfig {
        WebhookConfig {
            url,
            headers: HashMap::from([("X-Api-Key".to_string(), "secret".to_string())]),
            timeout_secs: 2,
            source: "tourney-watch".to_string(),
            enabled: true,
        }
    }

    fn slack_config(url: String) -> SlackConfig {
        SlackConfig {
            webhook_url: url,
            channel: Some("#alerts".to_string()),
            username: Some("AlertBot".to_string()),
            timeout_secs: 2,
            enabled: true,
        }
    }

    fn email_config(to: Vec<String>) -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "user".to_string(),
            password: "pass".to_string(),
            from: "alerts@example.com".to_string(),
            to,
            enabled: true,
        }
    }

    // ==================== Log ====================

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogNotifier::level_for(AlertSeverity::Critical), Level::ERROR);
        assert_eq!(LogNotifier::level_for(AlertSeverity::Error), Level::ERROR);
        assert_eq!(LogNotifier::level_for(AlertSeverity::Warning), Level::WARN);
        assert_eq!(LogNotifier::level_for(AlertSeverity::Info), Level::INFO);
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        let notifier = LogNotifier::new();
        assert!(notifier.is_enabled());
        for severity in [
            AlertSeverity::Info,
            AlertSeverity::Warning,
            AlertSeverity::Error,
            AlertSeverity::Critical,
        ] {
            let alert = create_test_alert(severity);
            let before = alert.clone();
            assert!(notifier.notify(&alert).await.is_ok());
            assert_eq!(alert, before);
        }
    }

    // ==================== Webhook ====================

    #[tokio::test]
    async fn test_webhook_posts_envelope_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("X-Api-Key", "secret"))
            .and(body_partial_json(serde_json::json!({
                "source": "tourney-watch",
                "alert": {"id": "health_database", "severity": "critical"}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(webhook_config(format!("{}/hook", server.uri()))).unwrap();
        notifier
            .notify(&create_test_alert(AlertSeverity::Critical))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_webhook_non_2xx_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(webhook_config(server.uri())).unwrap();
        let err = notifier
            .notify(&create_test_alert(AlertSeverity::Warning))
            .await
            .unwrap_err();
        assert!(matches!(err, WatchError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_disabled_webhook_is_noop() {
        let mut config = webhook_config("http://127.0.0.1:1/unreachable".to_string());
        config.enabled = false;
        let notifier = WebhookNotifier::new(config).unwrap();
        assert!(!notifier.is_enabled());
        assert!(notifier.notify(&create_test_alert(AlertSeverity::Info)).await.is_ok());
    }

    #[test]
    fn test_webhook_rejects_bad_header() {
        let mut config = webhook_config("http://localhost/hook".to_string());
        config.headers.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(WebhookNotifier::new(config), Err(WatchError::Config(_))));
    }

    // ==================== Slack ====================

    #[test]
    fn test_slack_colors() {
        let mut alert = create_test_alert(AlertSeverity::Critical);
        assert_eq!(SlackNotifier::color_for(&alert), "#ff0000");
        alert.severity = AlertSeverity::Error;
        assert_eq!(SlackNotifier::color_for(&alert), "#ff0000");
        alert.severity = AlertSeverity::Warning;
        assert_eq!(SlackNotifier::color_for(&alert), "#ff9500");
        alert.severity = AlertSeverity::Info;
        assert_eq!(SlackNotifier::color_for(&alert), "#36a64f");
        alert.status = AlertStatus::Resolved;
        assert_eq!(SlackNotifier::color_for(&alert), "#808080");
    }

    #[test]
    fn test_slack_payload_shape() {
        let notifier = SlackNotifier::new(slack_config("http://localhost".to_string())).unwrap();
        let alert = create_test_alert(AlertSeverity::Warning).with_value(1500.0, 1024.0);
        let payload = notifier.payload(&alert);

        assert_eq!(payload["username"], "AlertBot");
        assert_eq!(payload["channel"], "#alerts");
        assert_eq!(payload["attachments"][0]["color"], "#ff9500");
        assert_eq!(payload["attachments"][0]["title"], "Health check failed: database");
        assert_eq!(payload["attachments"][0]["fields"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_slack_requires_exactly_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(slack_config(server.uri())).unwrap();
        assert!(
            notifier
                .notify(&create_test_alert(AlertSeverity::Critical))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_slack_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"channel": "#alerts"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(slack_config(server.uri())).unwrap();
        notifier
            .notify(&create_test_alert(AlertSeverity::Info))
            .await
            .unwrap();
    }

    // ==================== Email ====================

    #[tokio::test]
    async fn test_email_stub_logs_and_succeeds() {
        let notifier = EmailNotifier::new(email_config(vec!["ops@example.com".to_string()]));
        assert_eq!(notifier.name(), "email");
        assert!(notifier.notify(&create_test_alert(AlertSeverity::Error)).await.is_ok());
    }

    #[tokio::test]
    async fn test_email_without_recipients_fails() {
        let notifier = EmailNotifier::new(email_config(vec![]));
        assert!(notifier.notify(&create_test_alert(AlertSeverity::Error)).await.is_err());
    }

    #[test]
    fn test_email_subject() {
        assert_eq!(
            EmailNotifier::subject(&create_test_alert(AlertSeverity::Critical)),
            "[CRITICAL] Health check failed: database"
        );
    }

    // ==================== Factory ====================

    #[test]
    fn test_build_notifiers_from_config() {
        let only_log = build_notifiers(&NotifierConfig::default()).unwrap();
        assert_eq!(only_log.len(), 1);
        assert_eq!(only_log[0].name(), "log");

        let config = NotifierConfig {
            webhook: Some(webhook_config("http://localhost/hook".to_string())),
            slack: Some(slack_config("http://localhost/slack".to_string())),
            email: Some(email_config(vec!["ops@example.com".to_string()])),
        };
        let names: Vec<String> = build_notifiers(&config)
            .unwrap()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        assert_eq!(names, vec!["log", "webhook", "slack", "email"]);
    }
}
