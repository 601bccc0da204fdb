//! Helper functions for creating specific error types

use super::types::WatchError;

/// Helper functions for creating specific errors
impl WatchError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn already_running<S: Into<String>>(message: S) -> Self {
        Self::AlreadyRunning(message.into())
    }

    pub fn not_running<S: Into<String>>(message: S) -> Self {
        Self::NotRunning(message.into())
    }

    pub fn terminated<S: Into<String>>(message: S) -> Self {
        Self::Terminated(message.into())
    }

    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery(message.into())
    }

    pub fn recovery<S: Into<String>>(message: S) -> Self {
        Self::Recovery(message.into())
    }

    pub fn probe<S: Into<String>>(message: S) -> Self {
        Self::Probe(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error reports an unknown id
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
