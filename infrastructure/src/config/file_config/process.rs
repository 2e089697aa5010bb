//! Console process configuration (`[process]` and `[marker]` sections)

use replbridge_domain::Extraction;
use serde::{Deserialize, Serialize};

/// Raw `[process]` configuration. Unset fields fall back to the dialect's
/// launch command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessConfig {
    /// Executable to launch (looked up on PATH)
    pub program: Option<String>,
    /// Arguments; only used together with `program`
    pub args: Vec<String>,
    /// Working directory for the console
    pub working_dir: Option<String>,
}

/// Raw `[marker]` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMarkerConfig {
    /// Prompt regex; defaults to the dialect's prompt
    pub pattern: Option<String>,
    /// How the response body is carved out of the output
    pub extraction: Extraction,
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;
    use super::*;

    #[test]
    fn test_process_section() {
        let toml_str = r#"
[process]
program = "pry-remote"
args = ["-w"]

[marker]
pattern = '^\[\d+\] '
extraction = "trimmed_before_prompt"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.process.program.as_deref(), Some("pry-remote"));
        assert_eq!(config.process.args, vec!["-w"]);
        assert_eq!(config.marker.pattern.as_deref(), Some(r"^\[\d+\] "));
        assert_eq!(config.marker.extraction, Extraction::TrimmedBeforePrompt);
    }
}
