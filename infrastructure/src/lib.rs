//! Infrastructure layer for replbridge
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer (process spawning, launch triggers, transcripts), the
//! debugger dialects, and configuration file loading.

pub mod config;
pub mod dialect;
pub mod logging;
pub mod port;
pub mod process;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBridgeConfig, FileConfig, FileLoggingConfig,
    FileMarkerConfig, FileOutputConfig, FileProcessConfig, FileSessionConfig,
};
pub use dialect::{PryDialect, strip_ansi};
pub use logging::JsonlTranscriptLogger;
pub use port::PortMonitor;
pub use process::TokioProcessSpawner;
