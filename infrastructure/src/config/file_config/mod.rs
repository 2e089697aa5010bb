//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate;
//! [`FileConfig::bridge_config`] turns them into a validated
//! [`BridgeConfig`].

mod bridge;
mod output;
mod process;
mod session;

pub use bridge::FileBridgeConfig;
pub use output::{FileLoggingConfig, FileOutputConfig};
pub use process::{FileMarkerConfig, FileProcessConfig};
pub use session::{DEFAULT_DEBUG_PORT, FileSessionConfig};

use replbridge_application::BridgeConfig;
use replbridge_domain::{DebuggerDialect, DomainError, LaunchSpec, ResponseMarker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Dialects this build knows how to drive.
pub const SUPPORTED_DIALECTS: &[&str] = &["pry"];

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("session.poll_interval_ms cannot be 0")]
    InvalidPollInterval,

    #[error("process.program cannot be empty")]
    EmptyProgram,

    #[error("Unknown dialect '{0}' (supported: {supported})", supported = SUPPORTED_DIALECTS.join(", "))]
    UnknownDialect(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub process: FileProcessConfig,
    pub marker: FileMarkerConfig,
    pub bridge: FileBridgeConfig,
    pub session: FileSessionConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check the values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.session.poll_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidPollInterval);
        }

        if let Some(program) = &self.process.program
            && program.trim().is_empty()
        {
            return Err(ConfigValidationError::EmptyProgram);
        }

        if !SUPPORTED_DIALECTS.contains(&self.session.dialect.as_str()) {
            return Err(ConfigValidationError::UnknownDialect(
                self.session.dialect.clone(),
            ));
        }

        if let Some(pattern) = &self.marker.pattern {
            ResponseMarker::new(pattern)?;
        }

        Ok(())
    }

    /// The configured launch command, or the dialect's.
    pub fn launch_spec(&self, dialect: &dyn DebuggerDialect) -> Result<LaunchSpec, DomainError> {
        match &self.process.program {
            Some(program) => Ok(LaunchSpec::new(program)?.with_args(self.process.args.clone())),
            None => Ok(dialect.launch_spec()),
        }
    }

    /// The configured prompt marker, or the dialect's.
    pub fn response_marker(
        &self,
        dialect: &dyn DebuggerDialect,
    ) -> Result<ResponseMarker, DomainError> {
        let marker = match &self.marker.pattern {
            Some(pattern) => ResponseMarker::new(pattern)?,
            None => dialect.response_marker(),
        };
        Ok(marker.with_extraction(self.marker.extraction))
    }

    pub fn bridge_config(
        &self,
        dialect: &dyn DebuggerDialect,
    ) -> Result<BridgeConfig, ConfigValidationError> {
        self.validate()?;
        let launch = self.launch_spec(dialect)?;
        let marker = self.response_marker(dialect)?;
        Ok(BridgeConfig::new(launch, Arc::new(marker))
            .with_dispatch(self.bridge.dispatch_policy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PryDialect;
    use replbridge_domain::{Extraction, OutputFormat, TerminationPolicy};
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[process]
program = "pry-remote"
args = ["-s", "localhost"]

[marker]
pattern = '^\[\d+\] pry'

[bridge]
min_command_interval_ms = 50
on_terminate = "abandon_pending"

[session]
port = 4444
auto_relaunch = false

[output]
format = "json"
color = false

[logging]
transcript_file = "/tmp/bridge.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.port, 4444);
        assert!(!config.session.auto_relaunch);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.strip_ansi);
        assert_eq!(
            config.logging.transcript_file.as_deref(),
            Some("/tmp/bridge.jsonl")
        );

        let bridge = config.bridge_config(&PryDialect::new()).unwrap();
        assert_eq!(bridge.launch.to_string(), "pry-remote -s localhost");
        assert_eq!(bridge.dispatch.min_interval, Duration::from_millis(50));
        assert_eq!(bridge.dispatch.on_terminate, TerminationPolicy::AbandonPending);
        assert!(bridge.matcher.match_response("x\n[1] pry> ").is_some());
        assert!(bridge.matcher.match_response("x\n[1] irb> ").is_none());
    }

    #[test]
    fn test_default_config_uses_dialect() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.port, DEFAULT_DEBUG_PORT);
        assert_eq!(config.marker.extraction, Extraction::BeforePrompt);

        let bridge = config.bridge_config(&PryDialect::new()).unwrap();
        assert_eq!(bridge.launch.to_string(), "rvm 2.1.10 exec pry-remote");
        assert_eq!(bridge.dispatch.min_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config = FileConfig::default();
        config.session.poll_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidPollInterval)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_program() {
        let mut config = FileConfig::default();
        config.process.program = Some("  ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::EmptyProgram)
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_dialect() {
        let mut config = FileConfig::default();
        config.session.dialect = "gdb".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Unknown dialect 'gdb' (supported: pry)");
    }

    #[test]
    fn test_validate_rejects_bad_marker() {
        let mut config = FileConfig::default();
        config.marker.pattern = Some("([".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::Domain(DomainError::InvalidMarker { .. }))
        ));
    }
}
