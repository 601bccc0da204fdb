//! Alert management system
//!
//! Alert storage, notification channels, the alert state machine and the rule
//! engine that feeds it.

mod channels;
mod manager;
mod processing;
mod source;
mod store;
mod types;

pub use channels::{
    EmailNotifier, LogNotifier, Notifier, SlackNotifier, WebhookNotifier, build_notifiers,
};
pub use manager::AlertManager;
pub use source::{MetricValueSource, RegistryValueSource, StaticValueSource};
pub use store::{AlertStore, InMemoryAlertStore, create_store};
pub use types::{AlertCondition, AlertRule, ComparisonOperator};
