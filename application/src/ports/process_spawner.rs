//! Process spawner port
//!
//! The bridge never touches the OS directly: it asks a [`ProcessSpawner`] for
//! a child with piped stdin/stdout/stderr. The tokio implementation lives in
//! the infrastructure layer; tests plug in in-memory pipes.

use async_trait::async_trait;
use replbridge_domain::LaunchSpec;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Errors that can occur while spawning the subprocess
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Executable not found: {0}")]
    NotFound(String),

    #[error("Failed to spawn process: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to capture {0} of spawned process")]
    MissingPipe(&'static str),
}

pub type ProcessInput = Box<dyn AsyncWrite + Send + Unpin>;
pub type ProcessOutput = Box<dyn AsyncRead + Send + Unpin>;

/// Control over a running child.
#[async_trait]
pub trait ChildProcess: Send {
    /// OS process id, when there is one.
    fn id(&self) -> Option<u32>;

    /// Wait for the child to exit. `None` means it exited without a code
    /// (e.g. killed by a signal).
    async fn wait(&mut self) -> std::io::Result<Option<i32>>;

    /// Forcefully stop the child.
    async fn kill(&mut self) -> std::io::Result<()>;
}

/// A freshly spawned child with its three pipes.
pub struct SpawnedProcess {
    pub stdin: ProcessInput,
    pub stdout: ProcessOutput,
    pub stderr: ProcessOutput,
    pub child: Box<dyn ChildProcess>,
}

/// Spawns the interactive subprocess.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, spec: &LaunchSpec) -> Result<SpawnedProcess, SpawnError>;
}
