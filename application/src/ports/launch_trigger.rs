//! Launch trigger port
//!
//! Decides when the subprocess should be (re)launched. A remote debugger
//! console can only attach once the debuggee has opened its server port, so
//! the debug session waits on a trigger before every launch.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum TriggerError {
    #[error("Waiting for launch trigger was cancelled")]
    Cancelled,

    #[error("Launch trigger probe failed: {0}")]
    Probe(String),
}

#[async_trait]
pub trait LaunchTrigger: Send + Sync {
    /// Resolve once the target is ready to be attached to.
    async fn wait_until_ready(&self, cancel: &CancellationToken) -> Result<(), TriggerError>;

    /// Human-readable description for status messages.
    fn describe(&self) -> String;
}

/// Trigger that is always ready.
pub struct Immediate;

#[async_trait]
impl LaunchTrigger for Immediate {
    async fn wait_until_ready(&self, cancel: &CancellationToken) -> Result<(), TriggerError> {
        if cancel.is_cancelled() {
            return Err(TriggerError::Cancelled);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "immediately".to_string()
    }
}
