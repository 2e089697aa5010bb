//! Dispatch policy: rate-limit floor and what happens to pending commands
//! when the subprocess goes away.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default minimum spacing between two writes to the subprocess (at most ten
/// commands per second). Flooding the console can corrupt its prompt state.
pub const DEFAULT_MIN_COMMAND_INTERVAL: Duration = Duration::from_millis(100);

/// Fate of queued and in-flight commands when the subprocess terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationPolicy {
    /// Resolve every pending command with a termination error.
    #[default]
    FailPending,
    /// Leave pending commands unresolved for as long as the bridge lives.
    AbandonPending,
}

impl TerminationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationPolicy::FailPending => "fail_pending",
            TerminationPolicy::AbandonPending => "abandon_pending",
        }
    }
}

impl std::str::FromStr for TerminationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_pending" | "fail" => Ok(TerminationPolicy::FailPending),
            "abandon_pending" | "abandon" => Ok(TerminationPolicy::AbandonPending),
            _ => Err(format!(
                "Invalid termination policy: {}. Valid: fail_pending, abandon_pending",
                s
            )),
        }
    }
}

impl std::fmt::Display for TerminationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How commands are fed to the subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Floor on the spacing between successive dispatches
    pub min_interval: Duration,
    pub on_terminate: TerminationPolicy,
}

impl DispatchPolicy {
    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn with_termination_policy(mut self, policy: TerminationPolicy) -> Self {
        self.on_terminate = policy;
        self
    }
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_COMMAND_INTERVAL,
            on_terminate: TerminationPolicy::default(),
        }
    }
}
