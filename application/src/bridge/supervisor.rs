//! Process supervisor: owns the lifecycle of one subprocess.
//!
//! The supervisor is driven from the bridge's event loop. Spawning starts
//! three background tasks per process (stdout pump, stderr pump, exit
//! watcher) which only ever *send* events tagged with the process generation;
//! all state changes happen when the event loop handles those events.

use crate::ports::process_spawner::{ChildProcess, ProcessInput, ProcessOutput, ProcessSpawner};
use replbridge_domain::{ExitReport, LaunchSpec, ProcessState, SENTINEL_EXIT_CODE};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long the exit watcher waits for the output pumps to drain after the
/// child exited (a grandchild may keep the pipes open).
const DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

const READ_BUFFER_SIZE: usize = 8192;

/// Raw event from a supervised process.
#[derive(Debug)]
pub enum ProcessEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Exited(Option<i32>),
}

/// A process event tagged with the generation of the process that produced
/// it, so events from a previous session can be told apart.
#[derive(Debug)]
pub struct TaggedEvent {
    pub generation: u64,
    pub event: ProcessEvent,
}

/// Result of a launch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started { pid: Option<u32> },
    /// A process is already running; nothing was done.
    AlreadyRunning,
    /// The spawn failed; termination has been reported with the sentinel
    /// exit code.
    SpawnFailed { reason: String },
}

pub struct ProcessSupervisor {
    spawner: Arc<dyn ProcessSpawner>,
    spec: LaunchSpec,
    events: mpsc::UnboundedSender<TaggedEvent>,
    state: ProcessState,
    generation: u64,
    stdin: Option<ProcessInput>,
    kill: Option<oneshot::Sender<()>>,
    /// Never reset; retained for diagnostics on every termination
    stderr: String,
}

impl ProcessSupervisor {
    pub fn new(
        spawner: Arc<dyn ProcessSpawner>,
        spec: LaunchSpec,
        events: mpsc::UnboundedSender<TaggedEvent>,
    ) -> Self {
        Self {
            spawner,
            spec,
            events,
            state: ProcessState::NotStarted,
            generation: 0,
            stdin: None,
            kill: None,
            stderr: String::new(),
        }
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Generation of the current (or most recent) process.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True when `generation` belongs to the process that is running now.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.is_running()
    }

    /// Spawn the subprocess unless one is already running.
    pub fn launch(&mut self) -> LaunchOutcome {
        if self.is_running() {
            debug!(
                "Launch requested while {} is running, ignoring",
                self.spec.program
            );
            return LaunchOutcome::AlreadyRunning;
        }

        let spawned = match self.spawner.spawn(&self.spec) {
            Ok(spawned) => spawned,
            Err(e) => {
                warn!("Failed to start subprocess {}: {}", self.spec, e);
                self.stdin = None;
                self.kill = None;
                self.state = ProcessState::Terminated(ExitReport::new(
                    SENTINEL_EXIT_CODE,
                    self.stderr.clone(),
                ));
                return LaunchOutcome::SpawnFailed {
                    reason: e.to_string(),
                };
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let pid = spawned.child.id();
        info!(
            "Launched {} (pid {:?}, generation {})",
            self.spec, pid, generation
        );

        let stdout = spawn_pump(
            spawned.stdout,
            generation,
            self.events.clone(),
            ProcessEvent::Stdout,
        );
        let stderr = spawn_pump(
            spawned.stderr,
            generation,
            self.events.clone(),
            ProcessEvent::Stderr,
        );
        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(watch_exit(
            spawned.child,
            kill_rx,
            [stdout, stderr],
            generation,
            self.events.clone(),
        ));

        self.stdin = Some(spawned.stdin);
        self.kill = Some(kill_tx);
        self.state = ProcessState::Running { pid };
        LaunchOutcome::Started { pid }
    }

    /// Write to the subprocess's stdin.
    ///
    /// Never fails on a torn-down process: with no process running the write
    /// is dropped and logged. I/O errors (e.g. a broken pipe because the child
    /// is exiting) are logged too; the exit event that follows does the
    /// cleanup.
    pub async fn write(&mut self, bytes: &[u8]) {
        let Some(stdin) = self.stdin.as_mut() else {
            warn!("Dropping write of {} bytes: no process running", bytes.len());
            return;
        };
        let result = async {
            stdin.write_all(bytes).await?;
            stdin.flush().await
        }
        .await;
        if let Err(e) = result {
            warn!("Failed to write to subprocess stdin: {}", e);
        }
    }

    pub fn append_stderr(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        debug!("Received err: {}", text.trim_end());
        self.stderr.push_str(&text);
    }

    /// Record the exit of the current process and return its report.
    pub fn handle_exit(&mut self, code: Option<i32>) -> ExitReport {
        let exit_code = code.unwrap_or(SENTINEL_EXIT_CODE);
        info!("{} exited with code {}", self.spec.program, exit_code);
        self.stdin = None;
        self.kill = None;
        let report = ExitReport::new(exit_code, self.stderr.clone());
        self.state = ProcessState::Terminated(report.clone());
        report
    }

    /// Ask the exit watcher to kill the child. Returns false when no process
    /// is running. The exit itself is reported through the usual event.
    pub fn request_kill(&mut self) -> bool {
        match self.kill.take() {
            Some(kill) => {
                info!("Killing {}", self.spec.program);
                // Watcher gone means the exit is already on its way
                let _ = kill.send(());
                true
            }
            None => false,
        }
    }
}

fn spawn_pump(
    mut output: ProcessOutput,
    generation: u64,
    events: mpsc::UnboundedSender<TaggedEvent>,
    wrap: fn(Vec<u8>) -> ProcessEvent,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let count = match output.read(&mut buffer).await {
                Ok(0) => break,
                Ok(count) => count,
                Err(e) => {
                    debug!("Output pump stopped: {}", e);
                    break;
                }
            };
            let event = TaggedEvent {
                generation,
                event: wrap(buffer[..count].to_vec()),
            };
            if events.send(event).is_err() {
                break;
            }
        }
    })
}

async fn watch_exit(
    mut child: Box<dyn ChildProcess>,
    kill: oneshot::Receiver<()>,
    pumps: [JoinHandle<()>; 2],
    generation: u64,
    events: mpsc::UnboundedSender<TaggedEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        requested = kill => {
            // A dropped sender means the bridge is gone: kill as well
            let _ = requested;
            if let Err(e) = child.kill().await {
                warn!("Failed to kill subprocess: {}", e);
            }
            child.wait().await
        }
    };
    let code = match status {
        Ok(code) => code,
        Err(e) => {
            warn!("Failed to wait for subprocess: {}", e);
            None
        }
    };

    // Deliver the remaining output before the exit so the last response is
    // still correlated.
    for pump in pumps {
        let abort = pump.abort_handle();
        if tokio::time::timeout(DRAIN_TIMEOUT, pump).await.is_err() {
            abort.abort();
        }
    }

    let _ = events.send(TaggedEvent {
        generation,
        event: ProcessEvent::Exited(code),
    });
}
