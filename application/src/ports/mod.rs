//! Ports (interfaces) for external adapters
//!
//! Ports define the boundaries between the application layer and the
//! infrastructure layer.

pub mod bridge_listener;
pub mod launch_trigger;
pub mod process_spawner;
pub mod transcript_logger;
