//! JSON output formatter: one object per line

use crate::output::formatter::{OutputFormatter, clean_response};
use replbridge_domain::{Breakpoint, StackTraceEntry};
use serde_json::{Value, json};

pub struct JsonFormatter {
    strip_ansi: bool,
}

impl JsonFormatter {
    pub fn new(strip_ansi: bool) -> Self {
        Self { strip_ansi }
    }

    fn clean(&self, text: &str) -> String {
        if self.strip_ansi {
            clean_response(text)
        } else {
            text.to_string()
        }
    }

    fn line(value: Value) -> String {
        value.to_string()
    }
}

impl OutputFormatter for JsonFormatter {
    fn response(&self, command: &str, text: &str) -> String {
        Self::line(json!({
            "type": "response",
            "command": command,
            "response": self.clean(text),
        }))
    }

    fn stack_trace(&self, frames: &[StackTraceEntry]) -> String {
        Self::line(json!({ "type": "stack_trace", "frames": frames }))
    }

    fn variables(&self, names: &[String]) -> String {
        Self::line(json!({ "type": "variables", "names": names }))
    }

    fn breakpoint(&self, breakpoint: &Breakpoint) -> String {
        Self::line(json!({ "type": "breakpoint", "breakpoint": breakpoint }))
    }

    fn unexpected_output(&self, text: &str) -> String {
        Self::line(json!({ "type": "unexpected_output", "output": self.clean(text) }))
    }

    fn terminated(&self, exit_code: i32, stderr: &str) -> String {
        Self::line(json!({ "type": "terminated", "exit_code": exit_code, "stderr": stderr }))
    }

    fn error(&self, message: &str) -> String {
        Self::line(json!({ "type": "error", "message": message }))
    }
}
