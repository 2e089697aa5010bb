//! Presentation layer for replbridge
//!
//! This crate contains CLI definitions, output formatters, the wait spinner
//! and the interactive debugger console.

pub mod cli;
pub mod output;
pub mod progress;
pub mod repl;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::{OutputFormatter, clean_response, formatter_for};
pub use output::json::JsonFormatter;
pub use output::listener::ConsoleListener;
pub use progress::reporter::WaitSpinner;
pub use repl::{DebugRepl, ReplCommand};
