//! Alerting and health monitoring
//!
//! [`AlertSystem`] is the entry point; the submodules hold the alert manager,
//! the health monitor and the metrics they share.

pub mod alerts;
pub mod health;
pub mod metrics;
pub mod shutdown;

mod system;
mod types;

pub use metrics::{AlertAction, AlertMetrics};
pub use shutdown::{Shutdown, ShutdownSignal, wait_for_os_signal};
pub use system::{AlertSystem, default_rules};
pub use types::{Alert, AlertFilter, AlertSeverity, AlertStatus, AlertType};
