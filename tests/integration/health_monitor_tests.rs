//! Health probes, alerting and recovery through the alert system

use crate::common::{SystemFixture, eventually};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tourney_watch::monitoring::health::RuntimeSample;
use tourney_watch::{AlertSeverity, HealthCheck, HealthState, RecoveryAction, Result};

#[derive(Debug, Default)]
struct CountingRecovery {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl RecoveryAction for CountingRecovery {
    async fn recover(&self, _check: &HealthCheck) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[tokio::test]
async fn test_missing_database_raises_critical_and_recovers_once() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;
    let recovery = Arc::new(CountingRecovery::default());
    system
        .monitor()
        .register_recovery("database", recovery.clone());

    system.check_now().await;

    let check = system.health_check("database").unwrap();
    assert_eq!(check.status, HealthState::Unhealthy);
    assert!(!check.message.is_empty());

    let alert = system.alert("health_database").await.unwrap();
    assert_eq!(alert.severity, AlertSeverity::Critical);
    assert_eq!(alert.source, "health_monitor");

    assert!(eventually(|| recovery.calls.load(Ordering::SeqCst) == 1).await);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(recovery.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_memory_pressure_degrades_then_recovers() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;

    fixture.sampler.set_sample(RuntimeSample {
        resident_bytes: 1500 * 1024 * 1024,
        ..SystemFixture::quiet_sample()
    });
    system.check_now().await;
    assert_eq!(
        system.health_check("memory").unwrap().status,
        HealthState::Degraded
    );
    let alert = system.alert("health_memory").await.unwrap();
    assert_eq!(alert.severity, AlertSeverity::Warning);
    assert_eq!(alert.threshold, Some(1024.0));

    fixture.sampler.set_sample(SystemFixture::quiet_sample());
    system.check_now().await;
    assert_eq!(
        system.health_check("memory").unwrap().status,
        HealthState::Healthy
    );
    assert!(
        system
            .active_alerts()
            .await
            .iter()
            .all(|a| a.id != "health_memory")
    );
}

#[tokio::test]
async fn test_overall_status_is_worst_of_probes() {
    let fixture = SystemFixture::new(None);
    let system = &fixture.system;
    assert_eq!(system.overall_status(), HealthState::Healthy);

    system.check_now().await;
    assert_eq!(system.overall_status(), HealthState::Unhealthy);
    assert_eq!(system.health_checks().len(), 5);
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_database_is_healthy() {
    let db = crate::common::TestDatabase::new().await;
    let fixture = SystemFixture::new(Some(db.handle()));
    let system = &fixture.system;
    system.initialize().await.unwrap();

    system.check_now().await;
    let check = system.health_check("database").unwrap();
    assert_eq!(check.status, HealthState::Healthy);
    assert!(check.details.contains_key("ping_ms"));
    assert_eq!(system.overall_status(), HealthState::Healthy);
    assert!(system.active_alerts().await.is_empty());
    assert!(system.monitor().has_recovery("database"));
}

#[tokio::test]
async fn test_health_metrics_are_exported() {
    let fixture = SystemFixture::new(None);
    fixture.system.check_now().await;

    let text = fixture.system.metrics_text().unwrap();
    assert!(text.contains("health_checks_total"));
    assert!(text.contains("health_check_duration_seconds"));
    assert!(text.contains("health_status"));
}
