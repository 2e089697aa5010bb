//! Bridge error types

use thiserror::Error;

/// Errors returned across the bridge's public contract.
///
/// Process death and misuse are reported as values; the bridge never panics
/// on expected conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Command bridge has not been launched")]
    NotLaunched,

    #[error("Subprocess is not running")]
    NotRunning,

    #[error("Subprocess terminated with exit code {exit_code} before the command completed")]
    Terminated { exit_code: i32 },

    #[error("Command bridge is closed")]
    Closed,
}

impl BridgeError {
    /// True when the error means the session ended (not a usage error).
    pub fn is_session_ended(&self) -> bool {
        matches!(self, BridgeError::NotRunning | BridgeError::Terminated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ended_classification() {
        assert!(BridgeError::NotRunning.is_session_ended());
        assert!(BridgeError::Terminated { exit_code: 1 }.is_session_ended());
        assert!(!BridgeError::NotLaunched.is_session_ended());
        assert!(!BridgeError::Closed.is_session_ended());
    }

    #[test]
    fn test_terminated_display() {
        let err = BridgeError::Terminated { exit_code: 137 };
        assert_eq!(
            err.to_string(),
            "Subprocess terminated with exit code 137 before the command completed"
        );
    }
}
