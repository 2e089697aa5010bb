//! Bridge configuration from TOML (`[bridge]` section)

use replbridge_domain::{DEFAULT_MIN_COMMAND_INTERVAL, DispatchPolicy, TerminationPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw `[bridge]` configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBridgeConfig {
    /// Minimum spacing between two commands, in milliseconds
    pub min_command_interval_ms: u64,
    /// What happens to pending commands when the console exits
    pub on_terminate: TerminationPolicy,
}

impl Default for FileBridgeConfig {
    fn default() -> Self {
        Self {
            min_command_interval_ms: DEFAULT_MIN_COMMAND_INTERVAL.as_millis() as u64,
            on_terminate: TerminationPolicy::default(),
        }
    }
}

impl FileBridgeConfig {
    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy::default()
            .with_min_interval(Duration::from_millis(self.min_command_interval_ms))
            .with_termination_policy(self.on_terminate)
    }
}
