//! Output and logging configuration (`[output]` and `[logging]` sections)

use replbridge_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Raw `[output]` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Remove ANSI escapes and `=> ` result markers from responses
    pub strip_ansi: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            strip_ansi: true,
        }
    }
}

/// Raw `[logging]` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of everything that crossed the bridge
    pub transcript_file: Option<String>,
    /// Diagnostic log file (in addition to stderr)
    pub log_file: Option<String>,
}
