//! Interactive process command bridge.
//!
//! - [`supervisor`]: spawns the subprocess and watches its lifecycle
//! - [`queue`]: FIFO queue, single command in flight, rate-limit floor
//! - [`correlator`]: incremental stdout decoding and prompt detection
//! - [`handle::CommandBridge`]: public façade
//!
//! Data flow: `send` enqueues; when nothing is in flight and the floor has
//! elapsed the head command is written to stdin and the accumulated output is
//! reset; stdout chunks are accumulated until the response marker matches,
//! which resolves the in-flight command (or, with nothing in flight, is
//! reported as unexpected output) and triggers the next dispatch.

mod actor;
pub mod correlator;
pub mod error;
pub mod handle;
pub mod queue;
pub mod supervisor;


pub use correlator::{Completion, OutputCorrelator};
pub use error::BridgeError;
pub use handle::{CommandBridge, CommandBridgeBuilder};
pub use queue::{CommandQueue, Dispatch, PendingCommand, QueueState};
pub use supervisor::LaunchOutcome;
