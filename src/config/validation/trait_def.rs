//! Validation trait definition

/// Validation for configuration structures
///
/// Errors are plain messages; loaders wrap them in a configuration error.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
