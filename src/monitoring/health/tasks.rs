//! Background health check tasks

use super::monitor::HealthMonitor;
use super::types::HealthCheck;
use crate::config::MAX_INTERVAL;
use crate::monitoring::shutdown::ShutdownSignal;
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl HealthMonitor {
    /// Start the periodic check loop
    ///
    /// The first tick fires immediately. Each pass runs on its own task so a
    /// slow probe never delays the next tick.
    pub(super) fn spawn_check_loop(&self, mut signal: ShutdownSignal, mut stop: ShutdownSignal) {
        let monitor = self.clone();
        let period = monitor
            .config
            .interval
            .clamp(Duration::from_millis(1), MAX_INTERVAL);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = signal.cancelled() => {
                        info!("Health check loop cancelled");
                        break;
                    }
                    _ = stop.cancelled() => {
                        debug!("Health check loop stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        let monitor = monitor.clone();
                        tokio::spawn(async move {
                            monitor.check_all().await;
                        });
                    }
                }
            }
        });
    }

    /// Run the probe's recovery action in the background, if auto-recovery is on
    pub(super) fn trigger_recovery(&self, check: &HealthCheck) {
        if !self.config.auto_recovery {
            return;
        }
        let Some(action) = self.recoveries.read().get(&check.name).cloned() else {
            return;
        };

        let check = check.clone();
        let timeout = self.config.recovery_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, action.recover(&check)).await {
                Ok(Ok(())) => info!("Recovery action {} succeeded", action.name()),
                Ok(Err(e)) => error!("Recovery action {} failed: {}", action.name(), e),
                Err(_) => warn!(
                    "Recovery action {} timed out after {:?}",
                    action.name(),
                    timeout
                ),
            }
        });
    }
}
