//! Test database utilities
//!
//! Each test gets an isolated in-memory SQLite connection through SeaORM.

use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tourney_watch::DatabaseHandle;

/// Test database wrapper around an in-memory SQLite connection
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a new in-memory test database
    pub async fn new() -> Self {
        let conn = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory test database");
        Self {
            inner: Arc::new(conn),
        }
    }

    /// The connection as the handle the health monitor probes
    pub fn handle(&self) -> Arc<dyn DatabaseHandle> {
        self.inner.clone()
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.inner
    }
}
