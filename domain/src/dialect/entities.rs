//! Debugger-facing entities produced by dialect response parsers.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A source breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub id: u32,
    pub file: String,
    pub line: u32,
}

impl Breakpoint {
    pub fn new(id: u32, file: impl Into<String>, line: u32) -> Self {
        Self {
            id,
            file: file.into(),
            line,
        }
    }

    /// Parse a `file:line` location. The id is left at 0 for the caller to
    /// assign.
    pub fn parse_location(location: &str) -> Result<Self, DomainError> {
        let (file, line) = location
            .rsplit_once(':')
            .ok_or_else(|| DomainError::InvalidBreakpoint(location.to_string()))?;
        let line: u32 = line
            .trim()
            .parse()
            .map_err(|_| DomainError::InvalidBreakpoint(location.to_string()))?;
        if file.trim().is_empty() || line == 0 {
            return Err(DomainError::InvalidBreakpoint(location.to_string()));
        }
        Ok(Self::new(0, file.trim(), line))
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One frame of the debuggee's call stack, innermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTraceEntry {
    pub index: usize,
    pub file: String,
    pub line: u32,
    /// Method or block the frame is executing
    pub context: String,
}
