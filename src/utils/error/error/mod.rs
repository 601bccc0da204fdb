//! Error handling for the alerting core
//!
//! This module defines all error types used throughout the crate.

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorResponse};
pub use types::{Result, WatchError};
