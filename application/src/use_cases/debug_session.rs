//! Debug session use case.
//!
//! A [`DebugSession`] drives a debugger console through a [`CommandBridge`]
//! using the vocabulary of one [`DebuggerDialect`]: each operation writes the
//! dialect's command and parses the console's response into a typed value.
//!
//! [`DebugSession::attach_loop`] keeps the console attached to the debuggee:
//! wait for the launch trigger (e.g. the debuggee opening its port), launch,
//! wait for the console to exit, and start over.

use crate::bridge::{BridgeError, CommandBridge, LaunchOutcome};
use crate::ports::launch_trigger::{LaunchTrigger, TriggerError};
use replbridge_domain::{Breakpoint, DebugCommand, DebuggerDialect, ProcessState, StackTraceEntry};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long [`DebugSession::terminate`] waits for the debuggee to resume
/// before killing the console.
pub const RESUME_BEFORE_KILL_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("{dialect} does not support {operation}")]
    Unsupported {
        dialect: String,
        operation: &'static str,
    },

    #[error("Failed to start debugger console: {0}")]
    SpawnFailed(String),

    #[error(transparent)]
    Trigger(#[from] TriggerError),
}

impl SessionError {
    /// True when the console is gone and the command should not be retried.
    pub fn is_session_ended(&self) -> bool {
        match self {
            SessionError::Bridge(e) => e.is_session_ended(),
            SessionError::SpawnFailed(_) => true,
            _ => false,
        }
    }
}

/// A debugger console session.
pub struct DebugSession<D> {
    bridge: CommandBridge,
    dialect: D,
    auto_relaunch: bool,
    breakpoints: Mutex<Vec<Breakpoint>>,
    next_breakpoint_id: AtomicU32,
}

impl<D: DebuggerDialect> DebugSession<D> {
    pub fn new(bridge: CommandBridge, dialect: D) -> Self {
        Self {
            bridge,
            dialect,
            auto_relaunch: true,
            breakpoints: Mutex::new(Vec::new()),
            next_breakpoint_id: AtomicU32::new(1),
        }
    }

    /// Whether [`attach_loop`](Self::attach_loop) relaunches after the
    /// console exits. Defaults to true.
    pub fn with_auto_relaunch(mut self, auto_relaunch: bool) -> Self {
        self.auto_relaunch = auto_relaunch;
        self
    }

    pub fn bridge(&self) -> &CommandBridge {
        &self.bridge
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Send a typed command and parse its response.
    pub async fn run<T>(&self, command: DebugCommand<T>) -> Result<T, SessionError> {
        let response = self.bridge.send(command.text()).await?;
        Ok(command.parse(&response))
    }

    /// Send text verbatim and return the raw response.
    pub async fn send_raw(&self, text: &str) -> Result<String, SessionError> {
        Ok(self.bridge.send(text).await?)
    }

    pub async fn stack_trace(&self) -> Result<Vec<StackTraceEntry>, SessionError> {
        self.run(self.dialect.stack_trace_command()).await
    }

    pub async fn step_over(&self) -> Result<(), SessionError> {
        self.run(self.dialect.step_over_command()).await
    }

    pub async fn step_into(&self) -> Result<(), SessionError> {
        self.run(self.dialect.step_into_command()).await
    }

    pub async fn step_out(&self) -> Result<(), SessionError> {
        self.run(self.dialect.step_out_command()).await
    }

    pub async fn resume(&self) -> Result<(), SessionError> {
        self.run(self.dialect.continue_command()).await
    }

    pub async fn pause(&self) -> Result<(), SessionError> {
        let command = self
            .dialect
            .pause_command()
            .ok_or_else(|| SessionError::Unsupported {
                dialect: self.dialect.name().to_string(),
                operation: "pause",
            })?;
        self.run(command).await
    }

    pub async fn evaluate(&self, expression: &str) -> Result<String, SessionError> {
        self.run(self.dialect.evaluate_command(expression)).await
    }

    pub async fn variables(&self) -> Result<Vec<String>, SessionError> {
        self.run(self.dialect.variables_command()).await
    }

    /// Set a breakpoint at `location`. Only a breakpoint the console
    /// accepted is assigned the next id.
    pub async fn set_breakpoint(&self, location: Breakpoint) -> Result<Breakpoint, SessionError> {
        self.run(self.dialect.set_breakpoint_command(&location))
            .await?;
        let id = self.next_breakpoint_id.fetch_add(1, Ordering::Relaxed);
        let breakpoint = Breakpoint { id, ..location };
        info!("Breakpoint {} set at {}", breakpoint.id, breakpoint);
        if let Ok(mut breakpoints) = self.breakpoints.lock() {
            breakpoints.push(breakpoint.clone());
        }
        Ok(breakpoint)
    }

    /// Breakpoints set through this session, in the order they were set.
    pub fn breakpoints(&self) -> Vec<Breakpoint> {
        self.breakpoints
            .lock()
            .map(|breakpoints| breakpoints.clone())
            .unwrap_or_default()
    }

    /// Keep the console attached until `cancel` fires.
    ///
    /// Each round waits for `trigger`, launches the console and waits for it
    /// to exit. Without auto-relaunch the loop ends after the first exit. A
    /// spawn failure ends the loop with an error instead of retrying.
    pub async fn attach_loop(
        &self,
        trigger: &dyn LaunchTrigger,
        cancel: &CancellationToken,
    ) -> Result<(), SessionError> {
        let mut states = self.bridge.state_changes();
        loop {
            info!("Waiting for debuggee ({})", trigger.describe());
            match trigger.wait_until_ready(cancel).await {
                Ok(()) => {}
                Err(TriggerError::Cancelled) => return Ok(()),
                Err(e) => return Err(e.into()),
            }

            match self.bridge.launch().await? {
                LaunchOutcome::Started { pid } => {
                    info!("Attached {} console (pid {:?})", self.dialect.name(), pid)
                }
                LaunchOutcome::AlreadyRunning => debug!("Console already attached"),
                LaunchOutcome::SpawnFailed { reason } => {
                    return Err(SessionError::SpawnFailed(reason));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                ended = async { states.wait_for(ProcessState::is_terminated).await.map(drop) } => {
                    ended.map_err(|_| BridgeError::Closed)?;
                }
            }
            info!("{} console exited", self.dialect.name());

            if !self.auto_relaunch {
                return Ok(());
            }
        }
    }

    /// Let the debuggee run on and kill the console.
    ///
    /// The continue command is best effort: a console that does not answer
    /// within [`RESUME_BEFORE_KILL_TIMEOUT`] is killed regardless. Returns
    /// false if no console was running.
    pub async fn terminate(&self) -> Result<bool, SessionError> {
        if !self.bridge.is_running() {
            return Ok(false);
        }
        let resume = self.bridge.send(self.dialect.continue_command().text());
        match tokio::time::timeout(RESUME_BEFORE_KILL_TIMEOUT, resume).await {
            Ok(Ok(_)) => debug!("Debuggee resumed"),
            Ok(Err(e)) => debug!("Resume before kill failed: {}", e),
            Err(_) => warn!("Debuggee did not resume in time, killing console"),
        }
        Ok(self.bridge.terminate().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::ports::launch_trigger::Immediate;
    use crate::ports::process_spawner::{
        ChildProcess, ProcessSpawner, SpawnError, SpawnedProcess,
    };
    use async_trait::async_trait;
    use replbridge_domain::{LaunchSpec, ResponseMarker};
    use std::collections::HashMap;
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::sync::watch;

    /// A console that answers each line from a script and exits on `exit`.
    /// Lines missing from the script get no answer at all.
    struct ScriptedSpawner {
        script: HashMap<&'static str, &'static str>,
        launches: Arc<AtomicUsize>,
        received: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedSpawner {
        fn new(script: &[(&'static str, &'static str)]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                launches: Arc::new(AtomicUsize::new(0)),
                received: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    struct ScriptedChild {
        exit: watch::Receiver<Option<Option<i32>>>,
        exit_tx: Arc<watch::Sender<Option<Option<i32>>>>,
    }

    #[async_trait]
    impl ChildProcess for ScriptedChild {
        fn id(&self) -> Option<u32> {
            Some(7)
        }

        async fn wait(&mut self) -> io::Result<Option<i32>> {
            let status = *self
                .exit
                .wait_for(Option::is_some)
                .await
                .map_err(|_| io::Error::other("exit channel closed"))?;
            Ok(status.flatten())
        }

        async fn kill(&mut self) -> io::Result<()> {
            self.exit_tx.send_replace(Some(None));
            Ok(())
        }
    }

    impl ProcessSpawner for ScriptedSpawner {
        fn spawn(&self, _spec: &LaunchSpec) -> Result<SpawnedProcess, SpawnError> {
            let (bridge_stdin, console_stdin) = tokio::io::duplex(4096);
            let (mut console_stdout, bridge_stdout) = tokio::io::duplex(4096);
            let (_console_stderr, bridge_stderr) = tokio::io::duplex(4096);
            let (exit_tx, exit_rx) = watch::channel(None);
            let exit_tx = Arc::new(exit_tx);
            let launch = self.launches.fetch_add(1, Ordering::SeqCst) + 1;

            let script = self.script.clone();
            let received = self.received.clone();
            let console_exit = exit_tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(console_stdin).lines();
                let mut counter = 0;
                while let Ok(Some(line)) = lines.next_line().await {
                    received.lock().unwrap().push(line.clone());
                    if line == "exit" {
                        drop(console_stdout);
                        console_exit.send_replace(Some(Some(0)));
                        return;
                    }
                    if let Some(answer) = script.get(line.as_str()) {
                        counter += 1;
                        let output = format!("{}\n[{}] launch{}> ", answer, counter, launch);
                        let _ = console_stdout.write_all(output.as_bytes()).await;
                    }
                }
            });

            Ok(SpawnedProcess {
                stdin: Box::new(bridge_stdin),
                stdout: Box::new(bridge_stdout),
                stderr: Box::new(bridge_stderr),
                child: Box::new(ScriptedChild {
                    exit: exit_rx,
                    exit_tx,
                }),
            })
        }
    }

    struct TestDialect;

    impl DebuggerDialect for TestDialect {
        fn name(&self) -> &str {
            "test"
        }

        fn launch_spec(&self) -> LaunchSpec {
            LaunchSpec::new("test-console").unwrap()
        }

        fn response_marker(&self) -> ResponseMarker {
            ResponseMarker::new(r"^\[\d+\]").unwrap()
        }

        fn stack_trace_command(&self) -> DebugCommand<Vec<StackTraceEntry>> {
            DebugCommand::new("where", |response| {
                response
                    .lines()
                    .enumerate()
                    .filter_map(|(index, line)| {
                        let (file, line) = line.split_once(':')?;
                        Some(StackTraceEntry {
                            index,
                            file: file.to_string(),
                            line: line.parse().ok()?,
                            context: String::new(),
                        })
                    })
                    .collect()
            })
        }

        fn step_over_command(&self) -> DebugCommand<()> {
            DebugCommand::fire_and_forget("over")
        }

        fn step_into_command(&self) -> DebugCommand<()> {
            DebugCommand::fire_and_forget("into")
        }

        fn step_out_command(&self) -> DebugCommand<()> {
            DebugCommand::fire_and_forget("out")
        }

        fn continue_command(&self) -> DebugCommand<()> {
            DebugCommand::fire_and_forget("go")
        }

        fn pause_command(&self) -> Option<DebugCommand<()>> {
            None
        }

        fn evaluate_command(&self, expression: &str) -> DebugCommand<String> {
            DebugCommand::verbatim(expression)
        }

        fn variables_command(&self) -> DebugCommand<Vec<String>> {
            DebugCommand::new("vars", |response| {
                response.split_whitespace().map(str::to_string).collect()
            })
        }

        fn set_breakpoint_command(&self, breakpoint: &Breakpoint) -> DebugCommand<()> {
            DebugCommand::fire_and_forget(format!("bp {}", breakpoint))
        }
    }

    fn session(spawner: ScriptedSpawner) -> DebugSession<TestDialect> {
        let config = BridgeConfig::for_dialect(&TestDialect);
        let bridge = CommandBridge::new(config, Arc::new(spawner));
        DebugSession::new(bridge, TestDialect)
    }

    #[tokio::test(start_paused = true)]
    async fn test_typed_commands_parse_responses() {
        let session = session(ScriptedSpawner::new(&[
            ("where", "a.rb:3\nb.rb:10"),
            ("vars", "x y z"),
            ("1 + 1", "=> 2"),
            ("over", ""),
        ]));
        session.bridge().launch().await.unwrap();

        let frames = session.stack_trace().await.unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].file, "b.rb");
        assert_eq!(frames[1].line, 10);

        assert_eq!(session.variables().await.unwrap(), vec!["x", "y", "z"]);
        assert_eq!(session.evaluate("1 + 1").await.unwrap(), "=> 2");
        session.step_over().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_unsupported_by_dialect() {
        let session = session(ScriptedSpawner::new(&[]));
        session.bridge().launch().await.unwrap();

        let err = session.pause().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Unsupported {
                operation: "pause",
                ..
            }
        ));
        assert!(!err.is_session_ended());
    }

    #[tokio::test(start_paused = true)]
    async fn test_breakpoints_get_sequential_ids() {
        let spawner = ScriptedSpawner::new(&[("bp a.rb:1", ""), ("bp b.rb:2", "")]);
        let received = spawner.received.clone();
        let session = session(spawner);
        session.bridge().launch().await.unwrap();

        let first = session
            .set_breakpoint(Breakpoint::parse_location("a.rb:1").unwrap())
            .await
            .unwrap();
        let second = session
            .set_breakpoint(Breakpoint::parse_location("b.rb:2").unwrap())
            .await
            .unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(session.breakpoints(), vec![first, second]);
        assert_eq!(*received.lock().unwrap(), vec!["bp a.rb:1", "bp b.rb:2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_breakpoint_does_not_consume_id() {
        let session = session(ScriptedSpawner::new(&[("bp a.rb:1", "")]));

        let err = session
            .set_breakpoint(Breakpoint::parse_location("a.rb:1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Bridge(BridgeError::NotLaunched)));
        assert!(session.breakpoints().is_empty());

        session.bridge().launch().await.unwrap();
        let set = session
            .set_breakpoint(Breakpoint::parse_location("a.rb:1").unwrap())
            .await
            .unwrap();
        assert_eq!(set.id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_after_console_exit_ends_session() {
        let session = session(ScriptedSpawner::new(&[]));
        session.bridge().launch().await.unwrap();

        let err = session.send_raw("exit").await.unwrap_err();
        assert!(err.is_session_ended());
        let err = session.send_raw("1").await.unwrap_err();
        assert!(matches!(err, SessionError::Bridge(BridgeError::NotRunning)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_kills_unresponsive_console() {
        let spawner = ScriptedSpawner::new(&[]);
        let received = spawner.received.clone();
        let session = session(spawner);
        assert!(!session.terminate().await.unwrap());

        session.bridge().launch().await.unwrap();
        assert!(session.terminate().await.unwrap());

        let mut states = session.bridge().state_changes();
        states.wait_for(ProcessState::is_terminated).await.unwrap();
        assert_eq!(*received.lock().unwrap(), vec!["go"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_loop_relaunches_until_cancelled() {
        let spawner = ScriptedSpawner::new(&[]);
        let launches = spawner.launches.clone();
        let session = Arc::new(session(spawner));
        let cancel = CancellationToken::new();

        let task = {
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { session.attach_loop(&Immediate, &cancel).await })
        };

        let mut states = session.bridge().state_changes();
        states.wait_for(ProcessState::is_running).await.unwrap();
        drop(session.send_raw("exit").await);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(launches.load(Ordering::SeqCst), 2);
        assert!(session.bridge().is_running());

        cancel.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_loop_without_relaunch_returns_after_exit() {
        let spawner = ScriptedSpawner::new(&[]);
        let launches = spawner.launches.clone();
        let session = Arc::new(session(spawner).with_auto_relaunch(false));
        let cancel = CancellationToken::new();

        let task = {
            let session = session.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { session.attach_loop(&Immediate, &cancel).await })
        };

        let mut states = session.bridge().state_changes();
        states.wait_for(ProcessState::is_running).await.unwrap();
        drop(session.send_raw("exit").await);

        assert!(task.await.unwrap().is_ok());
        assert_eq!(launches.load(Ordering::SeqCst), 1);
    }

    struct Unstartable;

    impl ProcessSpawner for Unstartable {
        fn spawn(&self, spec: &LaunchSpec) -> Result<SpawnedProcess, SpawnError> {
            Err(SpawnError::NotFound(spec.program.clone()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_loop_stops_on_spawn_failure() {
        let config = BridgeConfig::for_dialect(&TestDialect);
        let bridge = CommandBridge::new(config, Arc::new(Unstartable));
        let session = DebugSession::new(bridge, TestDialect);

        let err = session
            .attach_loop(&Immediate, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SpawnFailed(_)));
    }
}
