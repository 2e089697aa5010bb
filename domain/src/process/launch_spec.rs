//! What to launch.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Executable and argument list for the interactive subprocess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl LaunchSpec {
    /// Create a launch spec, rejecting an empty program.
    pub fn new(program: impl Into<String>) -> Result<Self, DomainError> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(DomainError::EmptyProgram);
        }
        Ok(Self {
            program,
            args: Vec::new(),
        })
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for LaunchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_display() {
        let spec = LaunchSpec::new("rvm")
            .unwrap()
            .with_arg("2.1.10")
            .with_args(["exec", "pry-remote"]);
        assert_eq!(spec.args, vec!["2.1.10", "exec", "pry-remote"]);
        assert_eq!(spec.to_string(), "rvm 2.1.10 exec pry-remote");
    }

    #[test]
    fn test_empty_program_rejected() {
        assert!(matches!(LaunchSpec::new("  "), Err(DomainError::EmptyProgram)));
    }
}
