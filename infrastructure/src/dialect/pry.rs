//! `pry-remote` console dialect.
//!
//! Stack traces come from `caller`, whose response is the inspected Ruby
//! array of `file:line:in 'method'` strings, usually wrapped in ANSI colour
//! codes. Frames belonging to `pry-remote` itself (and everything above them)
//! are skipped so frame 0 is the debuggee's own code.

use regex::Regex;
use replbridge_domain::{
    Breakpoint, DebugCommand, DebuggerDialect, LaunchSpec, ResponseMarker, StackTraceEntry,
};
use std::path::Path;
use std::sync::LazyLock;

/// `pry-remote`'s prompt: `[12] pry(main)> `
pub const PRY_PROMPT_PATTERN: &str = r"^\[\d+\]";

/// Frames from these files belong to the debugger, not the debuggee.
const DEBUGGER_FILES: &[&str] = &["pry-remote.rb"];

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    // Real escape sequences and their inspected form (`\e[31m`)
    Regex::new(r"(\x1B|\\e)\[[0-9;]*m").expect("Failed to compile ANSI escape regex")
});

static FRAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^"\s\[\],]+):(\d+):in [`']([^']*)'"#).expect("Failed to compile frame regex")
});

static PRY_MARKER: LazyLock<ResponseMarker> = LazyLock::new(|| {
    ResponseMarker::new(PRY_PROMPT_PATTERN).expect("Failed to compile pry prompt pattern")
});

/// Remove ANSI colour codes, raw or inspected.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// The `pry-remote` dialect.
#[derive(Debug, Clone)]
pub struct PryDialect {
    launch: LaunchSpec,
}

impl Default for PryDialect {
    fn default() -> Self {
        Self {
            launch: LaunchSpec {
                program: "rvm".to_string(),
                args: vec!["2.1.10".into(), "exec".into(), "pry-remote".into()],
            },
        }
    }
}

impl PryDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the launch command (e.g. plain `pry-remote` without rvm).
    pub fn with_launch(mut self, launch: LaunchSpec) -> Self {
        self.launch = launch;
        self
    }
}

/// Parse a `caller` response into frames below the debugger, innermost first.
pub fn parse_stack_trace(response: &str) -> Vec<StackTraceEntry> {
    let clean = strip_ansi(response);
    let mut entries = Vec::new();
    let mut found_debugger = false;

    for frame in FRAME.captures_iter(&clean) {
        let file = &frame[1];
        let is_debugger = Path::new(file)
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| DEBUGGER_FILES.contains(&name));
        if is_debugger {
            found_debugger = true;
            continue;
        }
        if !found_debugger {
            continue;
        }
        let Ok(line) = frame[2].parse() else {
            continue;
        };
        entries.push(StackTraceEntry {
            index: entries.len(),
            file: file.to_string(),
            line,
            context: frame[3].to_string(),
        });
    }
    entries
}

/// Parse an `ls -l` response into local variable names.
pub fn parse_variables(response: &str) -> Vec<String> {
    strip_ansi(response)
        .lines()
        .map(|line| line.split_once(':').map_or(line, |(_, names)| names))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

impl DebuggerDialect for PryDialect {
    fn name(&self) -> &str {
        "pry"
    }

    fn launch_spec(&self) -> LaunchSpec {
        self.launch.clone()
    }

    fn response_marker(&self) -> ResponseMarker {
        PRY_MARKER.clone()
    }

    fn stack_trace_command(&self) -> DebugCommand<Vec<StackTraceEntry>> {
        DebugCommand::new("caller", parse_stack_trace)
    }

    fn step_over_command(&self) -> DebugCommand<()> {
        DebugCommand::fire_and_forget("next")
    }

    fn step_into_command(&self) -> DebugCommand<()> {
        DebugCommand::fire_and_forget("step")
    }

    fn step_out_command(&self) -> DebugCommand<()> {
        DebugCommand::fire_and_forget("finish")
    }

    fn continue_command(&self) -> DebugCommand<()> {
        DebugCommand::fire_and_forget("continue")
    }

    fn pause_command(&self) -> Option<DebugCommand<()>> {
        None
    }

    fn evaluate_command(&self, expression: &str) -> DebugCommand<String> {
        DebugCommand::verbatim(expression)
    }

    fn variables_command(&self) -> DebugCommand<Vec<String>> {
        DebugCommand::new("ls -l", parse_variables)
    }

    fn set_breakpoint_command(&self, breakpoint: &Breakpoint) -> DebugCommand<()> {
        DebugCommand::fire_and_forget(format!("break {}:{}", breakpoint.file, breakpoint.line))
    }
}
