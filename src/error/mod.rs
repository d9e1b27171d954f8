//! Error handling
//!
//! Defines error types and handling for file operations.

pub mod handlers;
pub mod types;

pub use types::*;
