//! Pluggable debugger dialects.
//!
//! - [`traits::DebuggerDialect`]: command vocabulary of one debugger console
//! - [`command::DebugCommand`]: command text plus response parser
//! - [`entities`]: breakpoints and stack frames

pub mod command;
pub mod entities;
pub mod traits;

pub use command::DebugCommand;
pub use entities::{Breakpoint, StackTraceEntry};
pub use traits::DebuggerDialect;
