//! Alert manager implementation

use super::channels::Notifier;
use super::source::MetricValueSource;
use super::store::AlertStore;
use super::types::AlertRule;
use crate::config::AlertingConfig;
use crate::monitoring::metrics::{AlertAction, AlertMetrics};
use crate::monitoring::shutdown::{Lifecycle, ShutdownSignal};
use crate::monitoring::types::{Alert, AlertFilter, AlertStatus};
use crate::utils::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Mutable manager state, guarded by one lock
#[derive(Debug, Default)]
pub(super) struct ManagerState {
    /// Rule index
    pub(super) rules: HashMap<String, AlertRule>,
    /// Firing and silenced alerts by id
    pub(super) active: HashMap<String, Alert>,
    /// Silence expiry by alert id
    pub(super) silences: HashMap<String, DateTime<Utc>>,
    /// First breach seen for each rule still waiting out its duration
    pub(super) pending_since: HashMap<String, DateTime<Utc>>,
}

/// Alert state machine and rule engine
///
/// Fire, resolve and silence run under the state write lock, so transitions
/// on one id are serialized. The lock is a tokio lock because the store write
/// happens while it is held. Notifications are dispatched after the lock is
/// released, each on its own task.
#[derive(Debug, Clone)]
pub struct AlertManager {
    /// Configuration
    pub(super) config: AlertingConfig,
    pub(super) state: Arc<RwLock<ManagerState>>,
    pub(super) store: Arc<dyn AlertStore>,
    notifiers: Arc<Vec<Arc<dyn Notifier>>>,
    pub(super) values: Arc<dyn MetricValueSource>,
    pub(super) metrics: AlertMetrics,
    lifecycle: Arc<Lifecycle>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(
        config: AlertingConfig,
        store: Arc<dyn AlertStore>,
        notifiers: Vec<Arc<dyn Notifier>>,
        values: Arc<dyn MetricValueSource>,
        metrics: AlertMetrics,
    ) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ManagerState::default())),
            store,
            notifiers: Arc::new(notifiers),
            values,
            metrics,
            lifecycle: Arc::new(Lifecycle::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn AlertStore> {
        &self.store
    }

    pub fn metrics(&self) -> &AlertMetrics {
        &self.metrics
    }

    /// Start the alert manager
    ///
    /// Loads persisted rules, then evaluates them every
    /// `evaluation_interval` until [`AlertManager::stop`] is called or
    /// `signal` fires.
    pub async fn start(&self, signal: ShutdownSignal) -> Result<()> {
        let stop = self.lifecycle.begin("alert manager")?;

        if let Err(e) = self.load_rules().await {
            self.lifecycle.abort();
            return Err(e);
        }

        info!(
            "Starting alert manager (evaluation every {:?})",
            self.config.evaluation_interval
        );
        self.spawn_evaluation_loop(signal, stop);
        Ok(())
    }

    /// Stop the alert manager
    pub async fn stop(&self) -> Result<()> {
        self.lifecycle.end("alert manager")?;
        info!("Stopped alert manager");
        Ok(())
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    async fn load_rules(&self) -> Result<()> {
        let rules = self.store.get_rules().await?;
        let mut state = self.state.write().await;
        for rule in rules {
            state.rules.insert(rule.id.clone(), rule);
        }
        debug!("Loaded {} alert rules", state.rules.len());
        Ok(())
    }

    // ==================== Alerts ====================

    /// Fire an alert
    ///
    /// Returns `false` when an unexpired silence for its id dropped it.
    /// Notifier failures are logged and never reach the caller.
    pub async fn fire_alert(&self, alert: Alert) -> Result<bool> {
        let now = Utc::now();
        let alert = {
            let mut state = self.state.write().await;

            if let Some(until) = state.silences.get(&alert.id).copied() {
                if until > now {
                    debug!("Alert {} is silenced until {}, dropping", alert.id, until);
                    self.metrics.record_alert(&alert, AlertAction::Suppressed);
                    return Ok(false);
                }
                state.silences.remove(&alert.id);
            }

            let mut alert = alert;
            if let Some(existing) = state.active.get(&alert.id) {
                alert.created_at = existing.created_at;
                alert.starts_at = existing.starts_at;
            }
            alert.status = AlertStatus::Firing;
            alert.ends_at = None;

            self.store.save_alert(&alert).await?;
            state.active.insert(alert.id.clone(), alert.clone());
            alert
        };

        info!(
            alert_id = %alert.id,
            severity = %alert.severity,
            alert_type = %alert.alert_type,
            "Alert fired: {}",
            alert.title
        );
        self.metrics.record_alert(&alert, AlertAction::Fired);
        self.dispatch(alert);
        Ok(true)
    }

    /// Resolve an active alert
    pub async fn resolve_alert(&self, id: &str) -> Result<Alert> {
        let alert = {
            let mut state = self.state.write().await;
            let Some(mut alert) = state.active.get(id).cloned() else {
                return Err(WatchError::not_found(format!("active alert {}", id)));
            };

            alert.status = AlertStatus::Resolved;
            alert.ends_at = Some(Utc::now());
            self.store.save_alert(&alert).await?;
            state.active.remove(id);
            alert
        };

        let duration = alert
            .ends_at
            .and_then(|end| (end - alert.starts_at).to_std().ok())
            .unwrap_or_default();
        info!(alert_id = %alert.id, "Alert resolved after {:?}", duration);
        self.metrics.observe_alert_duration(&alert, duration);
        self.metrics.record_alert(&alert, AlertAction::Resolved);
        Ok(alert)
    }

    /// Silence an active alert for `duration`
    pub async fn silence_alert(&self, id: &str, duration: Duration) -> Result<Alert> {
        let until = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|span| Utc::now().checked_add_signed(span))
            .ok_or_else(|| WatchError::validation("silence duration is out of range"))?;

        let alert = {
            let mut state = self.state.write().await;
            let Some(mut alert) = state.active.get(id).cloned() else {
                return Err(WatchError::not_found(format!("active alert {}", id)));
            };

            alert.status = AlertStatus::Silenced;
            self.store.save_alert(&alert).await?;
            state.silences.insert(id.to_string(), until);
            state.active.insert(id.to_string(), alert.clone());
            alert
        };

        info!(alert_id = %alert.id, "Alert silenced for {:?}", duration);
        self.metrics.record_alert(&alert, AlertAction::Silenced);
        Ok(alert)
    }

    /// Whether `id` has a silence that has not expired yet
    pub async fn is_silenced(&self, id: &str) -> bool {
        self.state
            .read()
            .await
            .silences
            .get(id)
            .is_some_and(|until| *until > Utc::now())
    }

    /// Firing and silenced alerts, newest first
    pub async fn get_active_alerts(&self) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.state.read().await.active.values().cloned().collect();
        alerts.sort_by(|a, b| b.starts_at.cmp(&a.starts_at).then_with(|| a.id.cmp(&b.id)));
        alerts
    }

    /// Stored alerts matching `filter`
    pub async fn get_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        self.store.get_alerts(filter).await
    }

    pub async fn get_alert(&self, id: &str) -> Result<Alert> {
        self.store.get_alert(id).await
    }

    fn dispatch(&self, alert: Alert) {
        if !self.config.enable_notifications {
            return;
        }

        let alert = Arc::new(alert);
        for notifier in self.notifiers.iter().filter(|n| n.is_enabled()) {
            let notifier = notifier.clone();
            let alert = alert.clone();
            let metrics = self.metrics.clone();
            tokio::spawn(async move {
                match notifier.notify(&alert).await {
                    Ok(()) => {
                        debug!("Alert {} sent via {}", alert.id, notifier.name());
                        metrics.record_notification(notifier.name(), true);
                    }
                    Err(e) => {
                        warn!("Failed to send alert {} via {}: {}", alert.id, notifier.name(), e);
                        metrics.record_notification(notifier.name(), false);
                    }
                }
            });
        }
    }

    // ==================== Rules ====================

    /// Add or replace an alert rule, assigning an id when it has none
    pub async fn add_rule(&self, mut rule: AlertRule) -> Result<AlertRule> {
        if rule.id.trim().is_empty() {
            rule.id = uuid::Uuid::new_v4().to_string();
        }
        rule.validate().map_err(WatchError::validation)?;
        rule.updated_at = Utc::now();

        let mut state = self.state.write().await;
        self.store.save_rule(&rule).await?;
        state.rules.insert(rule.id.clone(), rule.clone());
        info!("Added alert rule: {} ({})", rule.name, rule.id);
        Ok(rule)
    }

    /// Replace an existing rule
    pub async fn update_rule(&self, mut rule: AlertRule) -> Result<AlertRule> {
        rule.validate().map_err(WatchError::validation)?;

        let mut state = self.state.write().await;
        let Some(existing) = state.rules.get(&rule.id) else {
            return Err(WatchError::not_found(format!("rule {}", rule.id)));
        };
        rule.created_at = existing.created_at;
        rule.updated_at = Utc::now();

        self.store.save_rule(&rule).await?;
        if !rule.enabled {
            state.pending_since.remove(&rule.id);
        }
        state.rules.insert(rule.id.clone(), rule.clone());
        info!("Updated alert rule: {} ({})", rule.name, rule.id);
        Ok(rule)
    }

    /// Remove a rule
    pub async fn remove_rule(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.rules.contains_key(id) {
            return Err(WatchError::not_found(format!("rule {}", id)));
        }

        match self.store.delete_rule(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        state.rules.remove(id);
        state.pending_since.remove(id);
        info!("Removed alert rule: {}", id);
        Ok(())
    }

    pub async fn get_rule(&self, id: &str) -> Result<AlertRule> {
        self.state
            .read()
            .await
            .rules
            .get(id)
            .cloned()
            .ok_or_else(|| WatchError::not_found(format!("rule {}", id)))
    }

    /// All rules, ordered by id
    pub async fn get_rules(&self) -> Vec<AlertRule> {
        let mut rules: Vec<AlertRule> = self.state.read().await.rules.values().cloned().collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        rules
    }
}
