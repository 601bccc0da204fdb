//! Error types for the alerting core

use thiserror::Error;

/// Result type alias for the alerting core
pub type Result<T> = std::result::Result<T, WatchError>;

/// Main error type for the alerting core
#[derive(Error, Debug)]
pub enum WatchError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown rule or alert id
    #[error("Not found: {0}")]
    NotFound(String),

    /// Start called on a running component
    #[error("Already running: {0}")]
    AlreadyRunning(String),

    /// Stop called on a component that is not running
    #[error("Not running: {0}")]
    NotRunning(String),

    /// Start called on a component that has already been stopped
    #[error("Terminated: {0}")]
    Terminated(String),

    /// Notification delivery failures
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Recovery action failures
    #[error("Recovery error: {0}")]
    Recovery(String),

    /// Probe-level failures, folded into a health check result by the monitor
    #[error("Probe error: {0}")]
    Probe(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Metrics registry errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}
