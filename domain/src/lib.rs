//! Domain layer for replbridge
//!
//! This crate contains the pure building blocks of the command bridge.
//! It has no dependencies on the async runtime or on process management.
//!
//! # Core Concepts
//!
//! ## Response marker
//!
//! An interactive console prints free-form text with no framing. The only
//! end-of-response signal is the prompt it prints when ready for the next
//! command; [`ResponseMarker`] recognises it and extracts the response body.
//!
//! ## Dispatch policy
//!
//! Commands are written one at a time with a minimum spacing
//! ([`DispatchPolicy`]); [`TerminationPolicy`] decides what happens to
//! pending commands when the console dies.
//!
//! ## Dialects
//!
//! [`DebuggerDialect`] captures the vocabulary of one debugger console.

pub mod config;
pub mod core;
pub mod dialect;
pub mod dispatch;
pub mod marker;
pub mod process;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::error::DomainError;
pub use dialect::{Breakpoint, DebugCommand, DebuggerDialect, StackTraceEntry};
pub use dispatch::{DEFAULT_MIN_COMMAND_INTERVAL, DispatchPolicy, TerminationPolicy};
pub use marker::{Extraction, MarkerMatch, ResponseMarker, ResponseMatcher};
pub use process::{ExitReport, LaunchSpec, ProcessState, SENTINEL_EXIT_CODE};
