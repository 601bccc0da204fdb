//! # tourney-watch
//!
//! Runtime observability for the tournament platform: periodic health probes,
//! threshold rules over named metrics, an alert lifecycle with silences, and
//! asynchronous fan-out to notification channels.
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tourney_watch::{AlertSystem, AlertSystemConfig, Shutdown, StaticValueSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AlertSystemConfig::from_env()?;
//!     let system = AlertSystem::new(config, None, Arc::new(StaticValueSource::new(0.0)))?;
//!     system.initialize().await?;
//!
//!     let shutdown = Shutdown::new();
//!     system.start(shutdown.signal()).await?;
//!     // ...
//!     shutdown.trigger();
//!     system.stop().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod monitoring;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::{AlertSystemConfig, Validate};
pub use monitoring::alerts::{
    AlertCondition, AlertManager, AlertRule, AlertStore, ComparisonOperator, InMemoryAlertStore,
    MetricValueSource, Notifier, RegistryValueSource, StaticValueSource,
};
pub use monitoring::health::{
    DatabaseHandle, HealthCheck, HealthMonitor, HealthState, RecoveryAction,
};
pub use monitoring::{
    Alert, AlertFilter, AlertMetrics, AlertSeverity, AlertStatus, AlertSystem, AlertType,
    Shutdown, ShutdownSignal,
};
pub use server::HttpServer;
pub use utils::error::{Result, WatchError};
