//! Launch triggers based on local TCP ports.

mod monitor;

pub use monitor::{DEFAULT_POLL_INTERVAL, PortMonitor};
