//! Database handle used by the database probe and recovery

use crate::utils::error::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

/// The database operations health checking needs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DatabaseHandle: Send + Sync + std::fmt::Debug {
    /// Check the connection is alive
    async fn ping(&self) -> Result<()>;

    /// Run a trivial query
    async fn query_probe(&self) -> Result<()>;

    /// Try to bring the connection back
    ///
    /// Pooled connections recover on their own, so the default only checks
    /// that they did.
    async fn reconnect(&self) -> Result<()> {
        self.ping().await
    }
}

#[async_trait::async_trait]
impl DatabaseHandle for DatabaseConnection {
    async fn ping(&self) -> Result<()> {
        DatabaseConnection::ping(self).await?;
        Ok(())
    }

    async fn query_probe(&self) -> Result<()> {
        let backend = self.get_database_backend();
        self.execute(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }
}
