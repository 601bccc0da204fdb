//! Health checking system
//!
//! Probes for the database, process memory, runtime task count, liveness
//! endpoints and disks, plus the monitor that schedules them.

pub mod components;
mod database;
mod monitor;
mod recovery;
mod sampler;
mod tasks;
pub mod types;


pub use database::DatabaseHandle;
#[cfg(test)]
pub use database::MockDatabaseHandle;
pub use monitor::HealthMonitor;
pub use recovery::{DatabaseRecovery, RecoveryAction};
pub use sampler::{DiskUsage, FixedSampler, ProcessSampler, RuntimeSample, RuntimeSampler};
pub use types::{AlertThreshold, HealthCheck, HealthState, ProbeKind, default_thresholds};
