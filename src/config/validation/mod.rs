//! Configuration validation
//!
//! - `trait_def`: the `Validate` trait
//! - `urls`: endpoint URL checks
//! - `validators`: `Validate` implementations for every configuration struct

mod trait_def;
mod urls;
mod validators;

pub use trait_def::Validate;
pub use urls::validate_http_url;
