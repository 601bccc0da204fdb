//! Integration tests for tourney-watch
//!
//! These tests drive a complete `AlertSystem` through its public API.

pub mod alert_lifecycle_tests;
pub mod config_tests;
pub mod health_monitor_tests;
pub mod notification_tests;
