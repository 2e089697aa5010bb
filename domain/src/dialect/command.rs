//! Typed debugger commands.

use std::fmt;

type ResponseParser<T> = Box<dyn Fn(&str) -> T + Send + Sync>;

/// A console command paired with the parser for its response text.
pub struct DebugCommand<T> {
    text: String,
    parser: ResponseParser<T>,
}

impl<T> DebugCommand<T> {
    pub fn new(
        text: impl Into<String>,
        parser: impl Fn(&str) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            text: text.into(),
            parser: Box::new(parser),
        }
    }

    /// The literal text written to the console.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Interpret the console's response to this command.
    pub fn parse(&self, response: &str) -> T {
        (self.parser)(response)
    }
}

impl DebugCommand<()> {
    /// A command whose response carries nothing of interest.
    pub fn fire_and_forget(text: impl Into<String>) -> Self {
        Self::new(text, |_| ())
    }
}

impl DebugCommand<String> {
    /// A command whose response is returned as-is.
    pub fn verbatim(text: impl Into<String>) -> Self {
        Self::new(text, str::to_string)
    }
}

impl<T> fmt::Debug for DebugCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugCommand")
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
