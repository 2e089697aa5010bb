//! JSONL transcript of bridge events.
//!
//! Each [`TranscriptEvent`] becomes one JSON object per line carrying `type`,
//! `timestamp` and a per-file sequence number `seq`. The file is opened in
//! append mode so consecutive sessions share one transcript.

use replbridge_application::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct Sink {
    writer: BufWriter<File>,
    seq: u64,
}

/// Transcript logger appending JSON lines to a file.
pub struct JsonlTranscriptLogger {
    sink: Mutex<Sink>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open (or create) the transcript at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            sink: Mutex::new(Sink {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn record(event: TranscriptEvent, seq: u64) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".into(), Value::String(event.event_type.into()));
            map.insert("timestamp".into(), Value::String(timestamp));
            map.insert("seq".into(), Value::from(seq));
            Value::Object(map)
        }
        other => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "seq": seq,
            "data": other,
        }),
    }
}

impl TranscriptLogger for JsonlTranscriptLogger {
    fn log(&self, event: TranscriptEvent) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        sink.seq += 1;
        let line = record(event, sink.seq);
        let result = writeln!(sink.writer, "{}", line).and_then(|_| sink.writer.flush());
        if let Err(e) = result {
            warn!("Failed to write transcript {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut sink) = self.sink.lock() {
            let _ = sink.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_object_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();

        logger.log(TranscriptEvent::new(
            "command_dispatched",
            json!({ "command": "caller" }),
        ));
        logger.log(TranscriptEvent::new(
            "response_received",
            json!({ "command": "caller", "response": "frames", "elapsed_ms": 12 }),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "command_dispatched");
        assert_eq!(lines[0]["command"], "caller");
        assert_eq!(lines[0]["seq"], 1);
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["response"], "frames");
        assert_eq!(lines[1]["seq"], 2);
    }

    #[test]
    fn test_wraps_non_object_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();
        logger.log(TranscriptEvent::new("unexpected_output", json!("[3] ready> ")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["data"], "[3] ready> ");
    }

    #[test]
    fn test_appends_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("t.jsonl");

        for _ in 0..2 {
            let logger = JsonlTranscriptLogger::open(&path).unwrap();
            logger.log(TranscriptEvent::new("process_terminated", json!({ "exit_code": 0 })));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        assert!(JsonlTranscriptLogger::open(blocker.join("t.jsonl")).is_err());
    }
}
