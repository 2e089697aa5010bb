//! Output formatter trait and response cleanup

use regex::Regex;
use replbridge_domain::{Breakpoint, OutputFormat, StackTraceEntry};
use std::sync::LazyLock;

static SGR_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B\[[0-9;]*m").expect("Failed to compile SGR escape regex")
});

/// pry's `=> ` result prefix at line start
static RESULT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^=> ").expect("Failed to compile result prefix regex"));

/// Remove colour codes and `=> ` result prefixes from console output.
pub fn clean_response(text: &str) -> String {
    let plain = SGR_ESCAPE.replace_all(text, "");
    RESULT_PREFIX.replace_all(&plain, "").into_owned()
}

/// Formats console traffic for the terminal.
pub trait OutputFormatter: Send + Sync {
    /// A response to a command the user typed
    fn response(&self, command: &str, text: &str) -> String;

    fn stack_trace(&self, frames: &[StackTraceEntry]) -> String;

    fn variables(&self, names: &[String]) -> String;

    fn breakpoint(&self, breakpoint: &Breakpoint) -> String;

    /// Output the console produced on its own (e.g. a breakpoint hit)
    fn unexpected_output(&self, text: &str) -> String;

    fn terminated(&self, exit_code: i32, stderr: &str) -> String;

    fn error(&self, message: &str) -> String;
}

/// Pick the formatter for `format`.
pub fn formatter_for(format: OutputFormat, strip_ansi: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(super::console::ConsoleFormatter::new(strip_ansi)),
        OutputFormat::Json => Box::new(super::json::JsonFormatter::new(strip_ansi)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_strips_sgr_and_result_prefix() {
        let raw = "\x1B[0m=> \x1B[1;34m42\x1B[0m\nputs => done";
        assert_eq!(clean_response(raw), "42\nputs => done");
    }

    #[test]
    fn test_clean_response_leaves_plain_text() {
        assert_eq!(clean_response("hello\nworld"), "hello\nworld");
    }
}
