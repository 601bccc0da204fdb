//! Automated recovery hooks run when a probe raises an alert

use super::database::DatabaseHandle;
use super::types::HealthCheck;
use crate::utils::error::{Result, WatchError};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Best-effort remediation tied to one probe name
#[async_trait::async_trait]
pub trait RecoveryAction: Send + Sync + std::fmt::Debug {
    /// Attempt to fix what `check` reported
    async fn recover(&self, check: &HealthCheck) -> Result<()>;

    fn name(&self) -> &str;
}

/// Re-establishes the database connection with one bounded attempt
///
/// A failed attempt is reported to the caller and not retried.
#[derive(Debug)]
pub struct DatabaseRecovery {
    db: Arc<dyn DatabaseHandle>,
    timeout: Duration,
}

impl DatabaseRecovery {
    pub fn new(db: Arc<dyn DatabaseHandle>) -> Self {
        Self {
            db,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait::async_trait]
impl RecoveryAction for DatabaseRecovery {
    async fn recover(&self, check: &HealthCheck) -> Result<()> {
        info!("Attempting database recovery: {}", check.message);

        match tokio::time::timeout(self.timeout, self.db.reconnect()).await {
            Ok(Ok(())) => {
                info!("Database connection recovered");
                Ok(())
            }
            Ok(Err(e)) => Err(WatchError::recovery(format!(
                "database still unreachable: {}",
                e
            ))),
            Err(_) => Err(WatchError::recovery(format!(
                "database reconnect timed out after {:?}",
                self.timeout
            ))),
        }
    }

    fn name(&self) -> &str {
        "database"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::health::database::MockDatabaseHandle;
    use crate::monitoring::health::types::HealthState;

    fn failed_check() -> HealthCheck {
        HealthCheck::new(
            "database",
            HealthState::Unhealthy,
            "database ping failed",
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_reconnects_once() {
        let mut db = MockDatabaseHandle::new();
        db.expect_reconnect().times(1).returning(|| Ok(()));

        let recovery = DatabaseRecovery::new(Arc::new(db));
        recovery.recover(&failed_check()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_reconnect_is_not_retried() {
        let mut db = MockDatabaseHandle::new();
        db.expect_reconnect()
            .times(1)
            .returning(|| Err(WatchError::internal("connection refused")));

        let recovery = DatabaseRecovery::new(Arc::new(db));
        let err = recovery.recover(&failed_check()).await.unwrap_err();
        assert!(matches!(err, WatchError::Recovery(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(recovery.name(), "database");
    }

    #[derive(Debug)]
    struct StalledDatabase;

    #[async_trait::async_trait]
    impl DatabaseHandle for StalledDatabase {
        async fn ping(&self) -> Result<()> {
            Ok(())
        }

        async fn query_probe(&self) -> Result<()> {
            Ok(())
        }

        async fn reconnect(&self) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reconnect_is_bounded() {
        let recovery =
            DatabaseRecovery::new(Arc::new(StalledDatabase)).with_timeout(Duration::from_millis(20));
        let err = recovery.recover(&failed_check()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
