//! Configuration management for the alert system
//!
//! Defaults, an optional YAML file and environment variables, in that order.

mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

#[cfg(test)]
mod tests;
