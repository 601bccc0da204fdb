//! Error handling utilities
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`WatchError`].

pub mod error;

pub use error::*;
