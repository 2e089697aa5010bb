//! Spinner shown while waiting for the debuggee

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// A spinner with a message, cleared or replaced when the wait ends.
pub struct WaitSpinner {
    bar: ProgressBar,
}

impl WaitSpinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        // Static template; a bad one would only lose the styling
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(TICK);
        Self { bar }
    }

    /// A spinner that draws nothing (for JSON output or non-interactive use).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
    }

    pub fn success(self, message: &str) {
        self.bar
            .finish_with_message(format!("{} {}", "v".green(), message));
    }

    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}
