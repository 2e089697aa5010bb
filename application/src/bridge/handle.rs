//! Command bridge façade.

use super::actor::{BridgeActor, Request};
use super::correlator::OutputCorrelator;
use super::error::BridgeError;
use super::queue::CommandQueue;
use super::supervisor::{LaunchOutcome, ProcessSupervisor};
use crate::config::BridgeConfig;
use crate::ports::bridge_listener::{BridgeListener, NoBridgeListener};
use crate::ports::process_spawner::ProcessSpawner;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptLogger};
use replbridge_domain::ProcessState;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Bridges an interactive console subprocess to request/response callers.
///
/// `CommandBridge` is a cheap, cloneable handle to a background task that owns
/// the subprocess. Commands are written one at a time, spaced by the
/// configured rate-limit floor, and each [`send`](Self::send) resolves with
/// exactly the output its command produced, in enqueue order.
///
/// The subprocess is killed once every handle has been dropped.
#[derive(Clone)]
pub struct CommandBridge {
    requests: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<ProcessState>,
}

/// Builder for [`CommandBridge`] with optional listener and transcript logger.
pub struct CommandBridgeBuilder {
    config: BridgeConfig,
    spawner: Arc<dyn ProcessSpawner>,
    listener: Arc<dyn BridgeListener>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl CommandBridgeBuilder {
    pub fn with_listener(mut self, listener: Arc<dyn BridgeListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_transcript_logger(mut self, transcript: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = transcript;
        self
    }

    /// Start the bridge task. Must be called from within a tokio runtime.
    pub fn build(self) -> CommandBridge {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ProcessState::NotStarted);

        let actor = BridgeActor {
            requests: requests_rx,
            events: events_rx,
            supervisor: ProcessSupervisor::new(self.spawner, self.config.launch, events_tx),
            queue: CommandQueue::new(self.config.dispatch.min_interval),
            correlator: OutputCorrelator::new(self.config.matcher),
            policy: self.config.dispatch,
            state_tx,
            listener: self.listener,
            transcript: self.transcript,
            retry_at: None,
            abandoned: Vec::new(),
        };
        tokio::spawn(actor.run());

        CommandBridge {
            requests: requests_tx,
            state: state_rx,
        }
    }
}

impl CommandBridge {
    pub fn builder(config: BridgeConfig, spawner: Arc<dyn ProcessSpawner>) -> CommandBridgeBuilder {
        CommandBridgeBuilder {
            config,
            spawner,
            listener: Arc::new(NoBridgeListener),
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    /// Create a bridge with no listener and no transcript.
    pub fn new(config: BridgeConfig, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self::builder(config, spawner).build()
    }

    /// Start the subprocess. A no-op while one is already running.
    ///
    /// A spawn failure is not an error here: it is returned as
    /// [`LaunchOutcome::SpawnFailed`] and reported to the listener as a
    /// termination with the sentinel exit code.
    pub async fn launch(&self) -> Result<LaunchOutcome, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Launch { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Queue a command and wait for its response.
    ///
    /// The command is enqueued when `send` is *called*, not when the returned
    /// future is first polled, so completion order always matches call order.
    /// There is no timeout: wrap the future if one is needed. Dropping the
    /// future does not cancel the command.
    pub fn send(
        &self,
        command: impl Into<String>,
    ) -> impl Future<Output = Result<String, BridgeError>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        let queued = self.requests.send(Request::Send {
            text: command.into(),
            reply,
        });
        async move {
            queued.map_err(|_| BridgeError::Closed)?;
            rx.await.map_err(|_| BridgeError::Closed)?
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    pub fn state(&self) -> ProcessState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every process state transition.
    pub fn state_changes(&self) -> watch::Receiver<ProcessState> {
        self.state.clone()
    }

    /// Kill the running subprocess. Returns false if none was running.
    ///
    /// The termination is reported like any other exit, and pending commands
    /// are flushed according to the termination policy.
    pub async fn terminate(&self) -> Result<bool, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Terminate { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }

    /// Number of commands queued or in flight.
    pub async fn queue_len(&self) -> Result<usize, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::QueueLen { reply })
            .map_err(|_| BridgeError::Closed)?;
        rx.await.map_err(|_| BridgeError::Closed)
    }
}
