//! Command dispatch policy.

pub mod policy;

pub use policy::{DEFAULT_MIN_COMMAND_INTERVAL, DispatchPolicy, TerminationPolicy};
