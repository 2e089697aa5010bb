//! Response marker matching.
//!
//! An interactive console has no message framing: the only signal that a
//! command finished is the prompt it prints before waiting for the next one.
//! [`ResponseMarker`] recognises that prompt in the text accumulated since the
//! last dispatch and carves the response body out of it.
//!
//! # Known limitation
//!
//! Only the final non-empty line of the buffer is tested against the pattern,
//! but nothing distinguishes a real prompt from command output that happens to
//! look like one. If a command prints a line matching the pattern as its last
//! line before the console is done, the response is cut short there.

use crate::core::error::DomainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the response body is carved out once the prompt line is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extraction {
    /// Everything before the prompt line, minus the line break preceding it.
    #[default]
    BeforePrompt,
    /// Like `BeforePrompt`, with surrounding blank lines and trailing
    /// whitespace removed.
    TrimmedBeforePrompt,
}

/// A completed response found in an accumulated buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    /// Response content, without the prompt line
    pub body: String,
    /// The prompt line exactly as received
    pub prompt: String,
}

/// Decides whether a buffer ends in a complete response.
///
/// Implementations must be pure: the same buffer always yields the same
/// answer, and `None` means "keep accumulating".
pub trait ResponseMatcher: Send + Sync + fmt::Debug {
    /// Match the text accumulated since the last dispatch.
    fn match_response(&self, buffer: &str) -> Option<MarkerMatch>;
}

/// Regex-driven prompt matcher.
///
/// The pattern is applied to a single line, so `^` anchors at the start of the
/// prompt line (e.g. `^\[\d+\]` for `[12] pry(main)> `).
#[derive(Debug, Clone)]
pub struct ResponseMarker {
    pattern: Regex,
    extraction: Extraction,
}

impl ResponseMarker {
    /// Compile a marker from a regular expression.
    pub fn new(pattern: &str) -> Result<Self, DomainError> {
        let pattern = Regex::new(pattern).map_err(|e| DomainError::InvalidMarker {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            extraction: Extraction::default(),
        })
    }

    /// Change how the body is extracted.
    pub fn with_extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// The source of the compiled pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn extraction(&self) -> Extraction {
        self.extraction
    }
}

impl ResponseMatcher for ResponseMarker {
    fn match_response(&self, buffer: &str) -> Option<MarkerMatch> {
        let (start, line) = final_line(buffer)?;
        if !self.pattern.is_match(line) {
            return None;
        }

        let before = strip_line_break(&buffer[..start]);
        let body = match self.extraction {
            Extraction::BeforePrompt => before.to_string(),
            Extraction::TrimmedBeforePrompt => before
                .trim_start_matches(['\r', '\n'])
                .trim_end()
                .to_string(),
        };

        Some(MarkerMatch {
            body,
            prompt: buffer[start..].to_string(),
        })
    }
}

/// Locate the last non-empty line: its byte offset and its text without the
/// line terminator.
fn final_line(buffer: &str) -> Option<(usize, &str)> {
    let content = buffer.trim_end_matches(['\r', '\n']);
    if content.is_empty() {
        return None;
    }
    let start = content.rfind('\n').map_or(0, |pos| pos + 1);
    Some((start, &content[start..]))
}

fn strip_line_break(text: &str) -> &str {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.strip_suffix('\r').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pry_marker() -> ResponseMarker {
        ResponseMarker::new(r"^\[\d+\]").unwrap()
    }

    #[test]
    fn test_single_chunk_response() {
        let m = pry_marker().match_response("hello\n[1] session> ").unwrap();
        assert_eq!(m.body, "hello");
        assert_eq!(m.prompt, "[1] session> ");
    }

    #[test]
    fn test_incomplete_buffer_keeps_accumulating() {
        assert!(pry_marker().match_response("partial").is_none());
        assert!(pry_marker().match_response("").is_none());
        assert!(pry_marker().match_response("\n\n").is_none());
    }

    #[test]
    fn test_split_marker_line_only_matches_when_complete() {
        let marker = pry_marker();
        assert!(marker.match_response("partial-line\n[").is_none());
        assert!(marker.match_response("partial-line\n[2").is_none());

        let m = marker.match_response("partial-line\n[2] ").unwrap();
        assert_eq!(m.body, "partial-line");
    }

    #[test]
    fn test_prompt_only_buffer_has_empty_body() {
        let m = pry_marker().match_response("[3] ready> ").unwrap();
        assert_eq!(m.body, "");
        assert_eq!(m.prompt, "[3] ready> ");
    }

    #[test]
    fn test_multiline_body_preserved() {
        let buffer = "line one\nline two\n\nline four\n[7] pry(main)> ";
        let m = pry_marker().match_response(buffer).unwrap();
        assert_eq!(m.body, "line one\nline two\n\nline four");
    }

    #[test]
    fn test_crlf_line_endings() {
        let m = pry_marker().match_response("=> 42\r\n[2] pry(main)> ").unwrap();
        assert_eq!(m.body, "=> 42");
    }

    #[test]
    fn test_prompt_must_be_final_line() {
        // A prompt-looking line followed by more output is not a completion
        assert!(pry_marker().match_response("[1] pry> \nstill printing").is_none());
    }

    #[test]
    fn test_trailing_newline_after_prompt_still_matches() {
        let m = pry_marker().match_response("out\n[4] pry> \n").unwrap();
        assert_eq!(m.body, "out");
        assert_eq!(m.prompt, "[4] pry> \n");
    }

    #[test]
    fn test_prompt_lookalike_in_output_is_misframed() {
        // Documented limitation: output whose last line looks like a prompt
        // completes the response early.
        let m = pry_marker().match_response("data\n[5] not really a prompt").unwrap();
        assert_eq!(m.body, "data");
    }

    #[test]
    fn test_trimmed_extraction() {
        let marker = pry_marker().with_extraction(Extraction::TrimmedBeforePrompt);
        let m = marker.match_response("\n  value  \n\n[1] pry> ").unwrap();
        assert_eq!(m.body, "  value");
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let marker = ResponseMarker::new(r"^\[\d+").unwrap();
        assert_eq!(marker.pattern(), r"^\[\d+");

        let err = ResponseMarker::new(r"^[").unwrap_err();
        assert!(err.is_marker_error());
    }
}
