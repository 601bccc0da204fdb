//! Alert and rule persistence
//!
//! [`AlertStore`] is the system of record for alerts and rules. The in-memory
//! implementation keeps everything behind a single reader/writer lock and makes
//! no durability promises.

use super::types::AlertRule;
use crate::config::StoreBackend;
use crate::monitoring::types::{Alert, AlertFilter, AlertStatus};
use crate::utils::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Persistence for alerts and alert rules
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync + std::fmt::Debug {
    /// Insert or replace an alert
    async fn save_alert(&self, alert: &Alert) -> Result<()>;

    /// Fetch an alert by id
    async fn get_alert(&self, id: &str) -> Result<Alert>;

    /// Replace an existing alert
    async fn update_alert(&self, alert: &Alert) -> Result<()>;

    /// Remove an alert
    async fn delete_alert(&self, id: &str) -> Result<()>;

    /// All alerts matching `filter`, newest first
    async fn get_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>>;

    /// Remove resolved alerts that ended before `cutoff`, returning how many went
    async fn purge_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Insert or replace a rule
    async fn save_rule(&self, rule: &AlertRule) -> Result<()>;

    /// Fetch a rule by id
    async fn get_rule(&self, id: &str) -> Result<AlertRule>;

    /// Replace an existing rule
    async fn update_rule(&self, rule: &AlertRule) -> Result<()>;

    /// Remove a rule
    async fn delete_rule(&self, id: &str) -> Result<()>;

    /// All rules, ordered by id
    async fn get_rules(&self) -> Result<Vec<AlertRule>>;
}

/// Build the store selected by configuration
pub fn create_store(backend: &StoreBackend) -> Arc<dyn AlertStore> {
    match backend {
        StoreBackend::Memory => Arc::new(InMemoryAlertStore::new()),
    }
}

#[derive(Debug, Default)]
struct StoreData {
    alerts: HashMap<String, Alert>,
    rules: HashMap<String, AlertRule>,
}

/// Reference store backed by process memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryAlertStore {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alerts
    pub fn alert_count(&self) -> usize {
        self.data.read().alerts.len()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn save_alert(&self, alert: &Alert) -> Result<()> {
        self.data
            .write()
            .alerts
            .insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    async fn get_alert(&self, id: &str) -> Result<Alert> {
        self.data
            .read()
            .alerts
            .get(id)
            .cloned()
            .ok_or_else(|| WatchError::not_found(format!("alert {}", id)))
    }

    async fn update_alert(&self, alert: &Alert) -> Result<()> {
        let mut data = self.data.write();
        match data.alerts.get_mut(&alert.id) {
            Some(existing) => {
                *existing = alert.clone();
                Ok(())
            }
            None => Err(WatchError::not_found(format!("alert {}", alert.id))),
        }
    }

    async fn delete_alert(&self, id: &str) -> Result<()> {
        self.data
            .write()
            .alerts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| WatchError::not_found(format!("alert {}", id)))
    }

    async fn get_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .data
            .read()
            .alerts
            .values()
            .filter(|alert| filter.matches(alert))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.starts_at.cmp(&a.starts_at).then_with(|| a.id.cmp(&b.id)));
        Ok(alerts)
    }

    async fn purge_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut data = self.data.write();
        let before = data.alerts.len();
        data.alerts.retain(|_, alert| {
            !(alert.status == AlertStatus::Resolved && alert.ends_at.is_some_and(|t| t < cutoff))
        });
        Ok(before - data.alerts.len())
    }

    async fn save_rule(&self, rule: &AlertRule) -> Result<()> {
        self.data.write().rules.insert(rule.id.clone(), rule.clone());
        Ok(())
    }

    async fn get_rule(&self, id: &str) -> Result<AlertRule> {
        self.data
            .read()
            .rules
            .get(id)
            .cloned()
            .ok_or_else(|| WatchError::not_found(format!("rule {}", id)))
    }

    async fn update_rule(&self, rule: &AlertRule) -> Result<()> {
        let mut data = self.data.write();
        match data.rules.get_mut(&rule.id) {
            Some(existing) => {
                *existing = rule.clone();
                Ok(())
            }
            None => Err(WatchError::not_found(format!("rule {}", rule.id))),
        }
    }

    async fn delete_rule(&self, id: &str) -> Result<()> {
        self.data
            .write()
            .rules
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| WatchError::not_found(format!("rule {}", id)))
    }

    async fn get_rules(&self) -> Result<Vec<AlertRule>> {
        let mut rules: Vec<AlertRule> = self.data.read().rules.values().cloned().collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rules)
    }
}
