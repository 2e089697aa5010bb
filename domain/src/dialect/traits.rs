//! The command vocabulary of one target debugger.

use super::command::DebugCommand;
use super::entities::{Breakpoint, StackTraceEntry};
use crate::marker::ResponseMarker;
use crate::process::LaunchSpec;

/// Everything that is specific to one debugger console: how to start it, what
/// its prompt looks like, and which literal strings mean "step", "continue",
/// etc.
pub trait DebuggerDialect: Send + Sync {
    /// Short identifier used in configuration (e.g. `pry`).
    fn name(&self) -> &str;

    fn launch_spec(&self) -> LaunchSpec;

    fn response_marker(&self) -> ResponseMarker;

    fn stack_trace_command(&self) -> DebugCommand<Vec<StackTraceEntry>>;

    fn step_over_command(&self) -> DebugCommand<()>;

    fn step_into_command(&self) -> DebugCommand<()>;

    fn step_out_command(&self) -> DebugCommand<()>;

    fn continue_command(&self) -> DebugCommand<()>;

    /// `None` when the console cannot interrupt a running debuggee.
    fn pause_command(&self) -> Option<DebugCommand<()>>;

    fn evaluate_command(&self, expression: &str) -> DebugCommand<String>;

    fn variables_command(&self) -> DebugCommand<Vec<String>>;

    fn set_breakpoint_command(&self, breakpoint: &Breakpoint) -> DebugCommand<()>;
}
