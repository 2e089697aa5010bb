//! Port for bridge notifications.
//!
//! The bridge reports two kinds of events that are not replies to a `send`:
//! the subprocess terminating, and output that completed a prompt while no
//! command was in flight (e.g. a breakpoint hit). There is no ordering
//! guarantee between the two kinds.

use replbridge_domain::ExitReport;
use tokio::sync::mpsc;

/// Receives bridge notifications.
///
/// Methods are invoked from the bridge's event loop and must return quickly.
/// Both default to no-ops.
pub trait BridgeListener: Send + Sync {
    /// The subprocess exited or failed to spawn. Fires once per termination.
    fn on_terminate(&self, _exit_code: i32, _stderr: &str) {}

    /// Output completed a prompt while nothing was in flight. `text` is the
    /// raw output, prompt line included. May fire any number of times.
    fn on_unexpected_output(&self, _text: &str) {}
}

/// No-op listener.
pub struct NoBridgeListener;

impl BridgeListener for NoBridgeListener {}

/// A bridge notification as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeNotification {
    Terminated(ExitReport),
    UnexpectedOutput(String),
}

/// Listener that forwards notifications into a channel, for callers that
/// prefer to `select!` over events instead of implementing a trait.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<BridgeNotification>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BridgeNotification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BridgeListener for ChannelListener {
    fn on_terminate(&self, exit_code: i32, stderr: &str) {
        // Receiver gone means nobody is interested any more
        let _ = self
            .tx
            .send(BridgeNotification::Terminated(ExitReport::new(exit_code, stderr)));
    }

    fn on_unexpected_output(&self, text: &str) {
        let _ = self
            .tx
            .send(BridgeNotification::UnexpectedOutput(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::new();
        listener.on_unexpected_output("[1] pry> ");
        listener.on_terminate(2, "oops");

        assert_eq!(
            rx.try_recv().unwrap(),
            BridgeNotification::UnexpectedOutput("[1] pry> ".to_string())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            BridgeNotification::Terminated(ExitReport::new(2, "oops"))
        );
    }

    #[test]
    fn test_channel_listener_tolerates_dropped_receiver() {
        let (listener, rx) = ChannelListener::new();
        drop(rx);
        listener.on_terminate(0, "");
    }
}
