//! Waits for a debuggee to open its debugger port.

use async_trait::async_trait;
use replbridge_application::ports::launch_trigger::{LaunchTrigger, TriggerError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Polls a local TCP port until something else is listening on it.
///
/// Each probe tries to bind `127.0.0.1:<port>`. If the bind fails the port is
/// taken, which is taken to mean the debuggee's server is up.
#[derive(Debug, Clone)]
pub struct PortMonitor {
    port: u16,
    poll_interval: Duration,
}

impl PortMonitor {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// One probe: true when the port cannot be bound.
    pub async fn is_taken(&self) -> bool {
        match TcpListener::bind(("127.0.0.1", self.port)).await {
            Ok(_listener) => false,
            Err(e) => {
                trace!("Port {} bind failed: {}", self.port, e);
                true
            }
        }
    }
}

#[async_trait]
impl LaunchTrigger for PortMonitor {
    async fn wait_until_ready(&self, cancel: &CancellationToken) -> Result<(), TriggerError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(TriggerError::Cancelled),
                _ = ticker.tick() => {}
            }
            if self.is_taken().await {
                debug!("Port {} is in use, debuggee is up", self.port);
                return Ok(());
            }
        }
    }

    fn describe(&self) -> String {
        format!("port {}", self.port)
    }
}
