//! Notification fan-out from the alert system to HTTP channels

use crate::common::{AlertFactory, SystemFixture};
use std::time::Duration;
use tourney_watch::AlertSeverity;
use tourney_watch::config::{SlackConfig, WebhookConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn wait_for_requests(server: &MockServer, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..200 {
        let received = server.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    server.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn test_fired_alert_reaches_webhook_and_slack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/slack"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = SystemFixture::config();
    config.notifiers.webhook = Some(WebhookConfig::new(format!("{}/hook", server.uri())));
    config.notifiers.slack = Some(SlackConfig::new(format!("{}/slack", server.uri())));
    let fixture = SystemFixture::with_config(config, None);

    fixture
        .system
        .fire_alert(AlertFactory::with_severity("db_down", AlertSeverity::Critical))
        .await
        .unwrap();

    let received = wait_for_requests(&server, 2).await;
    assert_eq!(received.len(), 2);

    let webhook = received
        .iter()
        .find(|r| r.url.path() == "/hook")
        .expect("webhook request");
    let body: serde_json::Value = serde_json::from_slice(&webhook.body).unwrap();
    assert_eq!(body["alert"]["id"], "db_down");
    assert_eq!(body["source"], "tourney-watch");

    let slack = received
        .iter()
        .find(|r| r.url.path() == "/slack")
        .expect("slack request");
    let body: serde_json::Value = serde_json::from_slice(&slack.body).unwrap();
    assert_eq!(body["attachments"][0]["color"], "#ff0000");
}

#[tokio::test]
async fn test_failing_channel_does_not_fail_the_fire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut config = SystemFixture::config();
    config.notifiers.webhook = Some(WebhookConfig::new(format!("{}/hook", server.uri())));
    let fixture = SystemFixture::with_config(config, None);

    fixture
        .system
        .fire_alert(AlertFactory::firing("noisy"))
        .await
        .unwrap();
    assert_eq!(fixture.system.active_alerts().await.len(), 1);

    wait_for_requests(&server, 1).await;
    let metrics = fixture.system.metrics_text().unwrap();
    assert!(metrics.contains("notifications_total"));
}

#[tokio::test]
async fn test_notifications_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = SystemFixture::config();
    config.alerting.enable_notifications = false;
    config.notifiers.webhook = Some(WebhookConfig::new(format!("{}/hook", server.uri())));
    let fixture = SystemFixture::with_config(config, None);

    fixture
        .system
        .fire_alert(AlertFactory::firing("quiet"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
