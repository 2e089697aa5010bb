//! Output correlator: turns the subprocess's stdout byte stream into
//! completed responses.
//!
//! Bytes arrive in arbitrary chunks. They are decoded incrementally (a UTF-8
//! sequence split across reads is held back until complete), appended to the
//! accumulated output, and the buffer is handed to the response matcher after
//! every chunk.
//!
//! A marker can match before its prompt line is fully written (`[1]` out of
//! `[1] pry(main)> `). Text arriving after a completion is therefore treated
//! as the rest of that prompt line until a newline ends it; only a new
//! prompt starting inside that line completes another response.

use replbridge_domain::ResponseMatcher;
use std::sync::Arc;

/// Longest prompt-line remainder held back before it is treated as output.
const MAX_PROMPT_TAIL: usize = 1024;

/// A response completed by a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Response content with the prompt line removed
    pub body: String,
    /// Everything accumulated for this cycle, prompt line included
    pub raw: String,
}

#[derive(Debug)]
pub struct OutputCorrelator {
    matcher: Arc<dyn ResponseMatcher>,
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
    /// Rest of the prompt line that completed the last response
    prompt_tail: Option<String>,
}

impl OutputCorrelator {
    pub fn new(matcher: Arc<dyn ResponseMatcher>) -> Self {
        Self {
            matcher,
            buffer: String::new(),
            partial: Vec::new(),
            prompt_tail: None,
        }
    }

    /// Discard everything accumulated so far. Called on every dispatch so no
    /// bytes from a previous cycle leak into the next.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.partial.clear();
        self.prompt_tail = None;
    }

    /// Text accumulated since the last reset or completion.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    /// Append a chunk of stdout. Returns a completion when the buffer now ends
    /// in a prompt; the buffer is consumed in that case.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<Completion> {
        let text = self.decode(bytes);
        if text.is_empty() {
            return None;
        }

        let Some(mut tail) = self.prompt_tail.take() else {
            self.buffer.push_str(&text);
            return self.complete_buffer();
        };
        tail.push_str(&text);

        if let Some(newline) = tail.find('\n') {
            // The prompt line ended; what follows is fresh output
            self.buffer.push_str(&tail[newline..]);
            return self.complete_buffer();
        }

        if let Some((start, body)) = self.prompt_within(&tail) {
            return Some(self.completed(body, tail.split_off(start)));
        }

        if tail.len() > MAX_PROMPT_TAIL {
            self.buffer = tail;
        } else {
            self.prompt_tail = Some(tail);
        }
        None
    }

    fn complete_buffer(&mut self) -> Option<Completion> {
        let found = self.matcher.match_response(&self.buffer)?;
        let raw = std::mem::take(&mut self.buffer);
        Some(self.completed(found.body, raw))
    }

    fn completed(&mut self, body: String, raw: String) -> Completion {
        self.prompt_tail = Some(String::new());
        Completion { body, raw }
    }

    /// Earliest position in a single prompt-line remainder where a new
    /// prompt starts.
    fn prompt_within(&self, line: &str) -> Option<(usize, String)> {
        line.char_indices().find_map(|(start, _)| {
            self.matcher
                .match_response(&line[start..])
                .map(|found| (start, found.body))
        })
    }

    /// Decode `bytes`, holding back an incomplete trailing sequence.
    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut pending = std::mem::take(&mut self.partial);
        pending.extend_from_slice(bytes);

        let mut decoded = String::new();
        let mut rest: &[u8] = &pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    decoded.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    decoded.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(invalid) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid..];
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.partial = rest.to_vec();
        decoded
    }
}
