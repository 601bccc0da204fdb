//! Common test utilities for tourney-watch
//!
//! - In-memory SQLite database handle
//! - Alert, rule and system fixtures
//! - Alert assertions and polling helpers

pub mod assertions;
#[cfg(feature = "sqlite")]
pub mod database;
pub mod fixtures;

#[cfg(feature = "sqlite")]
pub use database::TestDatabase;
pub use fixtures::{AlertFactory, RuleFactory, SystemFixture};

use std::time::Duration;

/// Poll `check` until it holds or two seconds pass
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
