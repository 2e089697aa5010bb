//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid response marker pattern '{pattern}': {reason}")]
    InvalidMarker { pattern: String, reason: String },

    #[error("Program to launch cannot be empty")]
    EmptyProgram,

    #[error("Invalid breakpoint location: {0}")]
    InvalidBreakpoint(String),
}

impl DomainError {
    /// Check if this error was caused by the response marker configuration
    pub fn is_marker_error(&self) -> bool {
        matches!(self, DomainError::InvalidMarker { .. })
    }
}
