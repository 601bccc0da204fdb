//! Configuration loading feeding a working alert system

use crate::common::SystemFixture;
use std::collections::HashMap;
use std::time::Duration;
use tourney_watch::{AlertSystemConfig, Validate};

#[test]
fn test_environment_builds_notifier_sections() {
    let vars: HashMap<&str, &str> = [
        ("WEBHOOK_URL", "https://hooks.example.com/alerts"),
        ("WEBHOOK_TIMEOUT_SECS", "3"),
        ("ENABLE_HEALTH_MONITOR", "false"),
        ("HEALTH_HTTP_ENDPOINTS", ""),
    ]
    .into_iter()
    .collect();

    let config =
        AlertSystemConfig::from_env_with(|key| vars.get(key).map(|v| v.to_string())).unwrap();
    assert_eq!(config.notifiers.webhook.unwrap().timeout_secs, 3);
    assert!(!config.health.enabled);
    assert_eq!(config.health.http_endpoints.len(), 1);
}

#[tokio::test]
async fn test_yaml_config_drives_the_system() {
    let path = std::env::temp_dir().join(format!("tourney-watch-it-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        "alerting:\n  evaluation_interval_secs: 1\n  retention_secs: 60\n  enable_default_rules: true\nhealth:\n  enabled: false\n  http_endpoints: []\n",
    )
    .unwrap();

    let config = AlertSystemConfig::load(Some(path.as_path())).await;
    std::fs::remove_file(&path).ok();
    let config = config.unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.alerting.retention, Duration::from_secs(60));

    let fixture = SystemFixture::with_config(config, None);
    fixture.system.initialize().await.unwrap();
    assert_eq!(fixture.system.rules().await.len(), 4);

    fixture
        .system
        .start(tourney_watch::ShutdownSignal::never())
        .await
        .unwrap();
    assert!(!fixture.system.monitor().is_running());
    fixture.system.stop().await.unwrap();
}

#[test]
fn test_invalid_notifier_url_fails_validation() {
    let vars: HashMap<&str, &str> = [("SLACK_WEBHOOK_URL", "not a url")].into_iter().collect();
    let err = AlertSystemConfig::from_env_with(|key| vars.get(key).map(|v| v.to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("Slack webhook"));
}
