//! Prints bridge notifications to the terminal

use crate::output::formatter::OutputFormatter;
use replbridge_application::BridgeListener;
use std::sync::Arc;

/// [`BridgeListener`] that prints unsolicited output and terminations.
pub struct ConsoleListener {
    formatter: Arc<dyn OutputFormatter>,
}

impl ConsoleListener {
    pub fn new(formatter: Arc<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }
}

impl BridgeListener for ConsoleListener {
    fn on_terminate(&self, exit_code: i32, stderr: &str) {
        eprintln!("{}", self.formatter.terminated(exit_code, stderr));
    }

    fn on_unexpected_output(&self, text: &str) {
        println!("\n{}", self.formatter.unexpected_output(text));
    }
}
