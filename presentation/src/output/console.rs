//! Console output formatter

use crate::output::formatter::{OutputFormatter, clean_response};
use colored::Colorize;
use replbridge_domain::{Breakpoint, StackTraceEntry};

/// Human-readable, coloured output
pub struct ConsoleFormatter {
    strip_ansi: bool,
}

impl ConsoleFormatter {
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

    fn header(title: &str) -> String {
        format!("── {} ──", title).yellow().bold().to_string()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn response(&self, _command: &str, text: &str) -> String {
        self.clean(text)
    }

    fn stack_trace(&self, frames: &[StackTraceEntry]) -> String {
        if frames.is_empty() {
            return "(no frames)".dimmed().to_string();
        }
        frames
            .iter()
            .map(|frame| {
                format!(
                    "{}  {}  {}",
                    format!("{:>3}", format!("#{}", frame.index)).cyan(),
                    format!("{}:{}", frame.file, frame.line).bold(),
                    frame.context.dimmed()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn variables(&self, names: &[String]) -> String {
        if names.is_empty() {
            return "(no locals)".dimmed().to_string();
        }
        names.join("  ")
    }

    fn breakpoint(&self, breakpoint: &Breakpoint) -> String {
        format!(
            "{} {} at {}",
            "Breakpoint".green().bold(),
            breakpoint.id,
            breakpoint
        )
    }

    fn unexpected_output(&self, text: &str) -> String {
        format!(
            "{}\n{}",
            Self::header("Found a debugger session"),
            self.clean(text)
        )
    }

    fn terminated(&self, exit_code: i32, stderr: &str) -> String {
        let status = format!("Console exited with code {}", exit_code);
        let status = if exit_code == 0 {
            status.dimmed().to_string()
        } else {
            status.red().bold().to_string()
        };
        if stderr.trim().is_empty() {
            status
        } else {
            format!("{}\n{}", status, stderr.trim_end().red())
        }
    }

    fn error(&self, message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }
}
