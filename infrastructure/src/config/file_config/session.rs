//! Debug session configuration from TOML (`[session]` section)

use serde::{Deserialize, Serialize};

/// Port `pry-remote` listens on by default.
pub const DEFAULT_DEBUG_PORT: u16 = 9876;

/// Raw `[session]` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Debugger dialect (`pry`)
    pub dialect: String,
    /// Port the debuggee opens when it hits a breakpoint
    pub port: u16,
    /// Wait for the port before launching the console
    pub wait_for_port: bool,
    /// Port probe interval, in milliseconds
    pub poll_interval_ms: u64,
    /// Relaunch the console each time it exits
    pub auto_relaunch: bool,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            dialect: "pry".to_string(),
            port: DEFAULT_DEBUG_PORT,
            wait_for_port: true,
            poll_interval_ms: 100,
            auto_relaunch: true,
        }
    }
}
