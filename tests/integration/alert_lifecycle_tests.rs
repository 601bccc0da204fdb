//! Alert state machine and rule engine through the alert system

use crate::common::assertions::AlertAssertions;
use crate::common::{AlertFactory, RuleFactory, SystemFixture};
use std::time::Duration;
use tourney_watch::{AlertFilter, AlertStatus, ShutdownSignal};

#[tokio::test]
async fn test_fire_resolve_round_trip() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;

    system.fire_alert(AlertFactory::firing("disk_full")).await.unwrap();
    system.alert("disk_full").await.unwrap().assert_status(AlertStatus::Firing);

    let resolved = system.resolve_alert("disk_full").await.unwrap();
    resolved.assert_status(AlertStatus::Resolved);
    assert!(system.active_alerts().await.is_empty());

    let stored = system.alert("disk_full").await.unwrap();
    assert_eq!(stored.ends_at, resolved.ends_at);

    let err = system.resolve_alert("disk_full").await.unwrap_err();
    assert!(err.is_not_found());
    system.alert("disk_full").await.unwrap().assert_status(AlertStatus::Resolved);
}

#[tokio::test]
async fn test_silenced_fire_is_dropped_until_expiry() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;

    system.fire_alert(AlertFactory::firing("flaky")).await.unwrap();
    system
        .silence_alert("flaky", Duration::from_millis(100))
        .await
        .unwrap()
        .assert_status(AlertStatus::Silenced);

    let mut refire = AlertFactory::firing("flaky");
    refire.description = "second attempt".to_string();
    system.fire_alert(refire).await.unwrap();
    let stored = system.alert("flaky").await.unwrap();
    stored.assert_status(AlertStatus::Silenced);
    assert_eq!(stored.description, "raised by an integration test");

    tokio::time::sleep(Duration::from_millis(150)).await;
    system.fire_alert(AlertFactory::firing("flaky")).await.unwrap();
    system.alert("flaky").await.unwrap().assert_status(AlertStatus::Firing);
    assert!(!system.manager().is_silenced("flaky").await);
}

#[tokio::test]
async fn test_concurrent_fires_are_not_lost() {
    let fixture = SystemFixture::new(None);
    let system = fixture.system.clone();

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let system = system.clone();
            tokio::spawn(async move {
                system
                    .fire_alert(AlertFactory::firing(&format!("alert-{}", i)))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(system.active_alerts().await.len(), 100);
    let stored = system
        .alerts(&AlertFilter::default().with_status(AlertStatus::Firing))
        .await
        .unwrap();
    assert_eq!(stored.len(), 100);
}

#[tokio::test]
async fn test_rule_breach_and_recovery() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;
    system.add_rule(RuleFactory::error_rate("r1")).await.unwrap();

    fixture.values.set("http_error_rate", 7.0);
    system.manager().evaluate_rules().await.unwrap();
    system.manager().evaluate_rules().await.unwrap();

    let active = system.active_alerts().await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "r1_performance");
    assert_eq!(active[0].value, Some(7.0));
    assert_eq!(active[0].threshold, Some(5.0));

    fixture.values.set("http_error_rate", 2.0);
    system.manager().evaluate_rules().await.unwrap();
    assert!(system.active_alerts().await.is_empty());
    system
        .alert("r1_performance")
        .await
        .unwrap()
        .assert_status(AlertStatus::Resolved);
}

#[tokio::test]
async fn test_running_system_evaluates_rules() {
    let mut config = SystemFixture::config();
    config.alerting.evaluation_interval = Duration::from_millis(20);
    let fixture = SystemFixture::with_config(config, None);
    let system = &fixture.system;

    system.add_rule(RuleFactory::error_rate("r1")).await.unwrap();
    fixture.values.set("http_error_rate", 9.0);
    system.start(ShutdownSignal::never()).await.unwrap();

    let mut fired = false;
    for _ in 0..100 {
        if system.alert("r1_performance").await.is_ok() {
            fired = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    system.stop().await.unwrap();
    assert!(fired, "rule never fired while the system was running");
}

#[tokio::test]
async fn test_stopped_system_cannot_restart() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;

    system.start(ShutdownSignal::never()).await.unwrap();
    system.stop().await.unwrap();
    assert!(system.start(ShutdownSignal::never()).await.is_err());
}
