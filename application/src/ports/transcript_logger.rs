//! Port for structured transcript logging.
//!
//! Defines the [`TranscriptLogger`] trait for recording what crossed the
//! bridge (dispatched commands, correlated responses, unsolicited output,
//! terminations) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! console transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured transcript event.
pub struct TranscriptEvent {
    /// Event type identifier (e.g., "command_dispatched", "response_received").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TranscriptEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript events.
///
/// `log` is called from the bridge's event loop, so it is synchronous and
/// non-fallible: logging failures must never stall or break the bridge.
pub trait TranscriptLogger: Send + Sync {
    /// Record a transcript event.
    fn log(&self, event: TranscriptEvent);
}

/// No-op implementation for tests and when transcripts are disabled.
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _event: TranscriptEvent) {}
}
