//! Interactive debugger console

pub mod command;
pub mod debug_repl;

pub use command::ReplCommand;
pub use debug_repl::DebugRepl;
