//! Debugger console dialects.

pub mod pry;

pub use pry::{PRY_PROMPT_PATTERN, PryDialect, strip_ansi};
