//! Spawns the console subprocess with tokio.

use async_trait::async_trait;
use replbridge_application::ports::process_spawner::{
    ChildProcess, ProcessSpawner, SpawnError, SpawnedProcess,
};
use replbridge_domain::LaunchSpec;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

/// [`ProcessSpawner`] backed by [`tokio::process::Command`].
///
/// The executable is resolved on `PATH` up front so a missing program is
/// reported as [`SpawnError::NotFound`] rather than a bare I/O error. The
/// child is killed when its handle is dropped, and on Linux also when this
/// process dies.
#[derive(Debug, Default, Clone)]
pub struct TokioProcessSpawner {
    working_dir: Option<PathBuf>,
}

impl TokioProcessSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl ProcessSpawner for TokioProcessSpawner {
    fn spawn(&self, spec: &LaunchSpec) -> Result<SpawnedProcess, SpawnError> {
        let program =
            which::which(&spec.program).map_err(|_| SpawnError::NotFound(spec.program.clone()))?;
        debug!("Spawning {} as {}", spec, program.display());

        let mut cmd = Command::new(&program);
        cmd.args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        // Linux: have the kernel terminate the child if we die without
        // running destructors.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn()?;
        let stdin = child.stdin.take().ok_or(SpawnError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(SpawnError::MissingPipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(SpawnError::MissingPipe("stderr"))?;

        Ok(SpawnedProcess {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            child: Box::new(TokioChild { child }),
        })
    }
}

struct TokioChild {
    child: Child,
}

#[async_trait]
impl ChildProcess for TokioChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> std::io::Result<Option<i32>> {
        let status = self.child.wait().await?;
        Ok(status.code())
    }

    async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use replbridge_application::{
        BridgeConfig, BridgeError, BridgeNotification, ChannelListener, CommandBridge,
        LaunchOutcome,
    };
    use replbridge_domain::ExitReport;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// A tiny REPL: echoes each line back, then prints a numbered prompt.
    const ECHO_REPL: &str =
        r#"n=0; while read line; do n=$((n+1)); echo "out:$line"; echo "[$n] "; done"#;

    fn sh(script: &str) -> LaunchSpec {
        LaunchSpec::new("sh").unwrap().with_args(["-c", script])
    }

    fn bridge(spec: LaunchSpec) -> (CommandBridge, UnboundedReceiver<BridgeNotification>) {
        let (listener, notifications) = ChannelListener::new();
        let config = BridgeConfig::with_pattern(spec, r"^\[\d+\]")
            .unwrap()
            .with_min_interval(Duration::from_millis(10));
        let bridge = CommandBridge::builder(config, Arc::new(TokioProcessSpawner::new()))
            .with_listener(Arc::new(listener))
            .build();
        (bridge, notifications)
    }

    #[test]
    fn test_missing_executable_is_not_found() {
        let spec = LaunchSpec::new("replbridge-no-such-program").unwrap();
        let result = TokioProcessSpawner::new().spawn(&spec);
        assert!(matches!(
            result,
            Err(SpawnError::NotFound(p)) if p == "replbridge-no-such-program"
        ));
    }

    #[tokio::test]
    async fn test_real_console_round_trip() {
        let (bridge, _notifications) = bridge(sh(ECHO_REPL));
        assert!(matches!(
            bridge.launch().await.unwrap(),
            LaunchOutcome::Started { pid: Some(_) }
        ));

        let first = bridge.send("hello");
        let second = bridge.send("world");
        assert_eq!(first.await, Ok("out:hello".to_string()));
        assert_eq!(second.await, Ok("out:world".to_string()));

        assert_eq!(bridge.terminate().await, Ok(true));
    }

    #[tokio::test]
    async fn test_exit_code_and_stderr_are_reported() {
        let (bridge, mut notifications) = bridge(sh("echo broken >&2; exit 3"));
        bridge.launch().await.unwrap();

        let notification = tokio::time::timeout(Duration::from_secs(10), notifications.recv())
            .await
            .unwrap();
        assert_eq!(
            notification,
            Some(BridgeNotification::Terminated(ExitReport::new(3, "broken\n")))
        );
        assert_eq!(bridge.send("late").await, Err(BridgeError::NotRunning));
    }

    #[tokio::test]
    async fn test_killed_console_reports_sentinel() {
        let (bridge, mut notifications) = bridge(sh("sleep 30"));
        bridge.launch().await.unwrap();
        assert_eq!(bridge.terminate().await, Ok(true));

        let notification = tokio::time::timeout(Duration::from_secs(10), notifications.recv())
            .await
            .unwrap();
        assert_eq!(
            notification,
            Some(BridgeNotification::Terminated(ExitReport::new(-1, "")))
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_through_bridge() {
        let (bridge, mut notifications) = bridge(LaunchSpec::new("replbridge-missing").unwrap());
        assert!(matches!(
            bridge.launch().await.unwrap(),
            LaunchOutcome::SpawnFailed { .. }
        ));
        assert_eq!(
            notifications.recv().await,
            Some(BridgeNotification::Terminated(ExitReport::new(-1, "")))
        );
    }
}
