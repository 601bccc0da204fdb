use super::*;
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn test_empty_environment_yields_defaults() {
    let config = AlertSystemConfig::from_env_with(lookup(&[])).unwrap();
    assert_eq!(config, AlertSystemConfig::default());
}

#[test]
fn test_environment_overrides() {
    let config = AlertSystemConfig::from_env_with(lookup(&[
        ("ALERT_EVALUATION_INTERVAL_SECS", "15"),
        ("ALERT_RETENTION_SECS", "3600"),
        ("ENABLE_NOTIFICATIONS", "false"),
        ("ENABLE_DEFAULT_RULES", "no"),
        ("HEALTH_CHECK_INTERVAL_SECS", "10"),
        ("ENABLE_AUTO_RECOVERY", "0"),
        ("HEALTH_HTTP_ENDPOINTS", "http://a.local/health, http://b.local/health,"),
        ("API_PORT", "8088"),
    ]))
    .unwrap();

    assert_eq!(config.alerting.evaluation_interval, Duration::from_secs(15));
    assert_eq!(config.alerting.retention, Duration::from_secs(3600));
    assert!(!config.alerting.enable_notifications);
    assert!(!config.alerting.enable_default_rules);
    assert_eq!(config.health.interval, Duration::from_secs(10));
    assert!(!config.health.auto_recovery);
    assert_eq!(
        config.health.http_endpoints,
        vec!["http://a.local/health", "http://b.local/health"]
    );
    assert_eq!(config.server.port, 8088);
}

#[test]
fn test_notifier_sections_created_from_environment() {
    let config = AlertSystemConfig::from_env_with(lookup(&[
        ("WEBHOOK_URL", "https://hooks.example.com/alerts"),
        ("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X"),
        ("SLACK_CHANNEL", "#ops"),
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_FROM", "alerts@example.com"),
        ("SMTP_TO", "ops@example.com,oncall@example.com"),
    ]))
    .unwrap();

    let webhook = config.notifiers.webhook.unwrap();
    assert_eq!(webhook.url, "https://hooks.example.com/alerts");
    assert_eq!(webhook.timeout_secs, 10);

    let slack = config.notifiers.slack.unwrap();
    assert_eq!(slack.channel.as_deref(), Some("#ops"));

    let email = config.notifiers.email.unwrap();
    assert_eq!(email.smtp_port, 587);
    assert_eq!(email.to.len(), 2);
}

#[test]
fn test_channel_without_url_is_ignored() {
    let config = AlertSystemConfig::from_env_with(lookup(&[("SLACK_CHANNEL", "#ops")])).unwrap();
    assert!(config.notifiers.slack.is_none());
}

#[test]
fn test_invalid_environment_values() {
    let err = AlertSystemConfig::from_env_with(lookup(&[("API_PORT", "eighty")])).unwrap_err();
    assert!(err.to_string().contains("API_PORT"));

    let err =
        AlertSystemConfig::from_env_with(lookup(&[("ENABLE_NOTIFICATIONS", "maybe")])).unwrap_err();
    assert!(err.to_string().contains("ENABLE_NOTIFICATIONS"));

    assert!(
        AlertSystemConfig::from_env_with(lookup(&[("ALERT_EVALUATION_INTERVAL_SECS", "0")]))
            .is_err()
    );
    assert!(AlertSystemConfig::from_env_with(lookup(&[("ALERT_STORE_BACKEND", "redis")])).is_err());
    assert!(
        AlertSystemConfig::from_env_with(lookup(&[("ALERT_RETENTION_SECS", "10000000000000")]))
            .is_err()
    );
}

#[test]
fn test_from_file() {
    let path = std::env::temp_dir().join(format!("tourney-watch-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"
alerting:
  evaluation_interval_secs: 5
  enable_default_rules: false
health:
  interval_secs: 20
  http_endpoints: []
notifiers:
  webhook:
    url: https://hooks.example.com/alerts
    headers:
      Authorization: Bearer token
server:
  port: 9191
"#,
    )
    .unwrap();

    let config = tokio_test::block_on(AlertSystemConfig::from_file(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.alerting.evaluation_interval, Duration::from_secs(5));
    assert!(!config.alerting.enable_default_rules);
    assert!(config.alerting.enable_notifications);
    assert_eq!(config.health.interval, Duration::from_secs(20));
    assert!(config.health.http_endpoints.is_empty());
    assert_eq!(config.server.port, 9191);
    let webhook = config.notifiers.webhook.unwrap();
    assert_eq!(webhook.headers["Authorization"], "Bearer token");
    assert_eq!(webhook.source, "tourney-watch");
}

#[tokio::test]
async fn test_from_file_errors() {
    let missing = std::env::temp_dir().join("tourney-watch-missing.yaml");
    let err = AlertSystemConfig::from_file(&missing).await.unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));

    let path = std::env::temp_dir().join(format!("tourney-watch-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(&path, "server:\n  port: 0\n").unwrap();
    let result = AlertSystemConfig::from_file(&path).await;
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}
