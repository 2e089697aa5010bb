//! Output format value object

use serde::{Deserialize, Serialize};

/// How console responses are rendered for the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one response after another (default)
    #[default]
    Text,
    /// One JSON object per response
    Json,
}
