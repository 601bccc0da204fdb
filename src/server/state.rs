//! Application state shared across HTTP handlers

use crate::monitoring::AlertSystem;
use std::sync::Arc;

/// HTTP server state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// The alert system behind every endpoint
    pub system: Arc<AlertSystem>,
}

impl AppState {
    pub fn new(system: Arc<AlertSystem>) -> Self {
        Self { system }
    }
}
