//! Interactive debugger console

use crate::output::formatter::OutputFormatter;
use crate::progress::reporter::WaitSpinner;
use crate::repl::command::{HELP, ReplCommand};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use replbridge_application::{DebugSession, SessionError};
use replbridge_domain::{DebuggerDialect, ProcessState};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const HISTORY_SIZE: usize = 1000;

/// Line-oriented front end for a [`DebugSession`].
///
/// Each line is parsed into a [`ReplCommand`] and run against the session.
/// While no console is attached the REPL shows a spinner and waits; it exits
/// on `:quit`, Ctrl-D, or once `session_over` is cancelled (the attach loop
/// ended).
pub struct DebugRepl<D: DebuggerDialect> {
    session: Arc<DebugSession<D>>,
    formatter: Arc<dyn OutputFormatter>,
    session_over: CancellationToken,
    waiting_for: String,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl<D: DebuggerDialect> DebugRepl<D> {
    pub fn new(
        session: Arc<DebugSession<D>>,
        formatter: Arc<dyn OutputFormatter>,
        session_over: CancellationToken,
    ) -> Self {
        Self {
            session,
            formatter,
            session_over,
            waiting_for: "debuggee".to_string(),
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("replbridge").join("history.txt")),
        }
    }

    /// What the spinner says is being waited for (e.g. `port 9876`).
    pub fn with_waiting_for(mut self, description: impl Into<String>) -> Self {
        self.waiting_for = description.into();
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = &self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            // No history is better than no console
            if let Ok(history) = FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
                editor = editor.with_history(Box::new(history));
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(self.session.dialect().name().to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            if !self.wait_for_console().await {
                break;
            }

            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match ReplCommand::parse(line) {
                        Ok(ReplCommand::Help) => println!("{}", HELP),
                        Ok(ReplCommand::Quit) => {
                            self.detach().await;
                            break;
                        }
                        Ok(command) => self.run_command(command).await,
                        Err(message) => eprintln!("{}", message),
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                Signal::CtrlD => {
                    self.detach().await;
                    break;
                }
            }
        }

        println!("Bye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("replbridge ({} dialect)", self.session.dialect().name());
        println!("Type :help for commands, :quit to detach.");
        println!();
    }

    /// Block until a console is attached. False when the session is over.
    async fn wait_for_console(&self) -> bool {
        if self.session.bridge().is_running() {
            return true;
        }
        if self.session_over.is_cancelled() {
            return false;
        }

        let spinner = if self.show_progress {
            WaitSpinner::start(format!("Waiting for {}...", self.waiting_for))
        } else {
            WaitSpinner::hidden()
        };
        let mut states = self.session.bridge().state_changes();
        let attached = tokio::select! {
            attached = async { states.wait_for(ProcessState::is_running).await.is_ok() } => attached,
            _ = self.session_over.cancelled() => false,
            _ = tokio::signal::ctrl_c() => false,
        };

        if attached {
            spinner.success("Attached");
        } else {
            spinner.clear();
        }
        attached
    }

    async fn run_command(&self, command: ReplCommand) {
        let outcome = tokio::select! {
            result = self.execute(command) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            Some(Ok(output)) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Some(Err(e)) => {
                eprintln!("{}", self.formatter.error(&e.to_string()));
                if e.is_session_ended() {
                    eprintln!("Debugger session ended");
                }
            }
            None => eprintln!("Stopped waiting (the command is still queued)"),
        }
    }

    async fn execute(&self, command: ReplCommand) -> Result<String, SessionError> {
        let session = &self.session;
        let output = match command {
            ReplCommand::Evaluate(expression) => {
                let response = session.evaluate(&expression).await?;
                self.formatter.response(&expression, &response)
            }
            ReplCommand::Raw(text) => {
                let response = session.send_raw(&text).await?;
                self.formatter.response(&text, &response)
            }
            ReplCommand::Backtrace => self.formatter.stack_trace(&session.stack_trace().await?),
            ReplCommand::Next => {
                session.step_over().await?;
                self.current_frame().await?
            }
            ReplCommand::Step => {
                session.step_into().await?;
                self.current_frame().await?
            }
            ReplCommand::Finish => {
                session.step_out().await?;
                self.current_frame().await?
            }
            ReplCommand::Continue => {
                session.resume().await?;
                String::new()
            }
            ReplCommand::Pause => {
                session.pause().await?;
                String::new()
            }
            ReplCommand::Variables => self.formatter.variables(&session.variables().await?),
            ReplCommand::Break(location) => {
                self.formatter.breakpoint(&session.set_breakpoint(location).await?)
            }
            ReplCommand::Breakpoints => session
                .breakpoints()
                .iter()
                .map(|breakpoint| self.formatter.breakpoint(breakpoint))
                .collect::<Vec<_>>()
                .join("\n"),
            ReplCommand::Help | ReplCommand::Quit => String::new(),
        };
        Ok(output)
    }

    /// The innermost frame, shown after a step.
    async fn current_frame(&self) -> Result<String, SessionError> {
        let frames = self.session.stack_trace().await?;
        Ok(self.formatter.stack_trace(&frames[..frames.len().min(1)]))
    }

    /// Let the debuggee run on and drop the console.
    async fn detach(&self) {
        if let Err(e) = self.session.terminate().await {
            eprintln!("{}", self.formatter.error(&e.to_string()));
        }
    }
}
