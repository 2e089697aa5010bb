//! Lifecycle state of the single owned subprocess.

use serde::{Deserialize, Serialize};

/// Exit code reported when the process could not be spawned, or when it died
/// without an exit code (killed by a signal).
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// How a subprocess ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReport {
    pub exit_code: i32,
    /// Everything the process wrote to stderr during its lifetime
    pub stderr: String,
}

impl ExitReport {
    pub fn new(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// State of the bridge's subprocess.
///
/// Exactly one subprocess is owned at a time. `Terminated` is not final:
/// a new launch moves back to `Running`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProcessState {
    #[default]
    NotStarted,
    Running {
        pid: Option<u32>,
    },
    Terminated(ExitReport),
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, ProcessState::Terminated(_))
    }

    pub fn exit_report(&self) -> Option<&ExitReport> {
        match self {
            ProcessState::Terminated(report) => Some(report),
            _ => None,
        }
    }
}
