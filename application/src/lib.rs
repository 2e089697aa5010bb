//! Application layer for replbridge
//!
//! This crate contains the command bridge, port definitions, application
//! configuration and the debug session use case. It depends only on the
//! domain layer.

pub mod bridge;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use bridge::{BridgeError, CommandBridge, CommandBridgeBuilder, LaunchOutcome};
pub use config::BridgeConfig;
pub use ports::{
    bridge_listener::{BridgeListener, BridgeNotification, ChannelListener, NoBridgeListener},
    launch_trigger::{Immediate, LaunchTrigger, TriggerError},
    process_spawner::{
        ChildProcess, ProcessInput, ProcessOutput, ProcessSpawner, SpawnError, SpawnedProcess,
    },
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::debug_session::{DebugSession, SessionError};
