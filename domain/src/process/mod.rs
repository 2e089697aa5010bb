//! Subprocess description and lifecycle state.

pub mod launch_spec;
pub mod state;

pub use launch_spec::LaunchSpec;
pub use state::{ExitReport, ProcessState, SENTINEL_EXIT_CODE};
