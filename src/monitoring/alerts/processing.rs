//! Rule evaluation and retention

use super::manager::AlertManager;
use super::types::AlertRule;
use crate::config::MAX_INTERVAL;
use crate::monitoring::shutdown::ShutdownSignal;
use crate::monitoring::types::Alert;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl AlertManager {
    /// Evaluate every enabled rule once
    ///
    /// A failing rule is logged and skipped; the others still run.
    pub async fn evaluate_rules(&self) -> Result<()> {
        let rules: Vec<AlertRule> = {
            let state = self.state.read().await;
            state.rules.values().filter(|r| r.enabled).cloned().collect()
        };
        debug!("Evaluating {} alert rules", rules.len());

        let now = Utc::now();
        for rule in &rules {
            if let Err(e) = self.evaluate_rule(rule, now).await {
                warn!("Failed to evaluate rule {}: {}", rule.name, e);
            }
        }

        Ok(())
    }

    /// Evaluate a single alert rule
    pub(super) async fn evaluate_rule(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<()> {
        let value = match self.values.value(&rule.query).await {
            Ok(value) => value,
            Err(e) if e.is_not_found() => {
                debug!("No data for rule {}: {}", rule.id, e);
                self.state.write().await.pending_since.remove(&rule.id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let breached = rule.condition().evaluate(value);
        let alert_id = rule.alert_id();
        let active = self.state.read().await.active.contains_key(&alert_id);

        if breached {
            if active || !self.breach_held(rule, now).await {
                return Ok(());
            }

            let mut alert = Alert::new(
                alert_id,
                rule.alert_type,
                rule.severity,
                format!("Alert rule triggered: {}", rule.name),
                format!(
                    "Rule '{}' triggered: {} {} {} (current value: {})",
                    rule.name, rule.query, rule.operator, rule.threshold, value
                ),
                "alert_rule",
            )
            .with_value(value, rule.threshold)
            .with_label("rule_id", rule.id.clone());
            alert.labels.extend(rule.labels.clone());
            alert.annotations.extend(rule.annotations.clone());

            self.fire_alert(alert).await?;
        } else {
            self.state.write().await.pending_since.remove(&rule.id);
            if active {
                match self.resolve_alert(&alert_id).await {
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    /// Track the first breach and report whether it has lasted `rule.duration`
    async fn breach_held(&self, rule: &AlertRule, now: DateTime<Utc>) -> bool {
        if rule.duration.is_zero() {
            return true;
        }
        let mut state = self.state.write().await;
        let since = *state.pending_since.entry(rule.id.clone()).or_insert(now);
        let held = (now - since).to_std().unwrap_or_default();
        if held < rule.duration {
            debug!(
                "Rule {} breached for {:?}, waiting for {:?}",
                rule.id, held, rule.duration
            );
            return false;
        }
        true
    }

    /// Delete resolved alerts older than the retention period
    ///
    /// A retention reaching back past the earliest representable time
    /// sweeps nothing.
    pub async fn sweep_resolved(&self) -> Result<usize> {
        let cutoff = chrono::Duration::from_std(self.config.retention)
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention));
        let Some(cutoff) = cutoff else {
            debug!("Retention {:?} is out of range, nothing to sweep", self.config.retention);
            return Ok(0);
        };
        let removed = self.store.purge_resolved_before(cutoff).await?;
        if removed > 0 {
            debug!("Swept {} resolved alerts", removed);
        }
        Ok(removed)
    }

    /// Start rule evaluation task
    pub(super) fn spawn_evaluation_loop(&self, mut signal: ShutdownSignal, mut stop: ShutdownSignal) {
        let manager = self.clone();
        let period = manager
            .config
            .evaluation_interval
            .clamp(Duration::from_millis(1), MAX_INTERVAL);

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);

            loop {
                tokio::select! {
                    _ = signal.cancelled() => {
                        info!("Alert evaluation loop cancelled");
                        break;
                    }
                    _ = stop.cancelled() => {
                        debug!("Alert evaluation loop stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = manager.evaluate_rules().await {
                            error!("Failed to evaluate alert rules: {}", e);
                        }
                        if let Err(e) = manager.sweep_resolved().await {
                            error!("Failed to sweep resolved alerts: {}", e);
                        }
                    }
                }
            }
        });
    }
}
