//! The bridge's single logical owner.
//!
//! One task owns the supervisor, the queue and the correlator. Requests from
//! [`CommandBridge`](super::handle::CommandBridge) handles and events from
//! the process pumps arrive on two channels and are handled one at a time,
//! so no two handlers ever mutate bridge state concurrently.

use super::correlator::{Completion, OutputCorrelator};
use super::error::BridgeError;
use super::queue::{CommandQueue, Dispatch, PendingCommand};
use super::supervisor::{LaunchOutcome, ProcessEvent, ProcessSupervisor, TaggedEvent};
use crate::ports::bridge_listener::BridgeListener;
use crate::ports::transcript_logger::{TranscriptEvent, TranscriptLogger};
use replbridge_domain::{DispatchPolicy, ExitReport, ProcessState, TerminationPolicy};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, trace};

pub(crate) type Reply = oneshot::Sender<Result<String, BridgeError>>;

/// Characters of a response echoed into debug logs.
const LOG_TAIL_CHARS: usize = 100;

pub(crate) enum Request {
    Launch {
        reply: oneshot::Sender<LaunchOutcome>,
    },
    Send {
        text: String,
        reply: Reply,
    },
    Terminate {
        reply: oneshot::Sender<bool>,
    },
    QueueLen {
        reply: oneshot::Sender<usize>,
    },
}

pub(crate) struct BridgeActor {
    pub(crate) requests: mpsc::UnboundedReceiver<Request>,
    pub(crate) events: mpsc::UnboundedReceiver<TaggedEvent>,
    pub(crate) supervisor: ProcessSupervisor,
    pub(crate) queue: CommandQueue<Reply>,
    pub(crate) correlator: OutputCorrelator,
    pub(crate) policy: DispatchPolicy,
    pub(crate) state_tx: watch::Sender<ProcessState>,
    pub(crate) listener: Arc<dyn BridgeListener>,
    pub(crate) transcript: Arc<dyn TranscriptLogger>,
    /// When set, a dispatch deferred by the rate limit is retried then
    pub(crate) retry_at: Option<Instant>,
    /// Completion handles kept unresolved under `AbandonPending`
    pub(crate) abandoned: Vec<Reply>,
}

impl BridgeActor {
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => break,
                },
                Some(event) = self.events.recv() => self.handle_event(event).await,
                _ = retry_timer(self.retry_at) => {
                    self.retry_at = None;
                    self.try_dispatch().await;
                }
            }
        }

        debug!("All bridge handles dropped, shutting down");
        self.supervisor.request_kill();
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Launch { reply } => {
                let outcome = self.launch();
                let _ = reply.send(outcome);
            }
            Request::Send { text, reply } => self.enqueue(text, reply).await,
            Request::Terminate { reply } => {
                let _ = reply.send(self.supervisor.request_kill());
            }
            Request::QueueLen { reply } => {
                let _ = reply.send(self.queue.len());
            }
        }
    }

    fn launch(&mut self) -> LaunchOutcome {
        let outcome = self.supervisor.launch();
        match &outcome {
            LaunchOutcome::Started { .. } => {
                self.correlator.reset();
                self.publish_state();
            }
            LaunchOutcome::SpawnFailed { .. } => {
                if let Some(report) = self.supervisor.state().exit_report().cloned() {
                    self.teardown(report);
                }
            }
            LaunchOutcome::AlreadyRunning => {}
        }
        outcome
    }

    async fn enqueue(&mut self, text: String, reply: Reply) {
        let refusal = match self.supervisor.state() {
            ProcessState::NotStarted => Some(BridgeError::NotLaunched),
            ProcessState::Terminated(_) => Some(BridgeError::NotRunning),
            ProcessState::Running { .. } => None,
        };
        if let Some(err) = refusal {
            debug!("Refusing command {}: {}", text, err);
            let _ = reply.send(Err(err));
            return;
        }

        debug!(
            "Enqueueing command: {}, queue size: {}",
            text,
            self.queue.len()
        );
        self.queue.enqueue(PendingCommand::new(text, reply));
        self.try_dispatch().await;
    }

    async fn try_dispatch(&mut self) {
        match self.queue.poll_dispatch(Instant::now()) {
            Dispatch::Write(text) => {
                debug!("Sending command: {}", text);
                self.correlator.reset();
                self.transcript.log(TranscriptEvent::new(
                    "command_dispatched",
                    json!({ "command": text }),
                ));
                let mut line = text;
                line.push('\n');
                self.supervisor.write(line.as_bytes()).await;
            }
            Dispatch::RetryAt(at) => {
                trace!(
                    "Rate limit: deferring dispatch by {:?}",
                    at.saturating_duration_since(Instant::now())
                );
                self.retry_at = Some(at);
            }
            Dispatch::Nothing => {}
        }
    }

    async fn handle_event(&mut self, tagged: TaggedEvent) {
        if !self.supervisor.is_current(tagged.generation) {
            trace!(
                "Ignoring event from stale process generation {}",
                tagged.generation
            );
            return;
        }

        match tagged.event {
            ProcessEvent::Stdout(bytes) => {
                if let Some(completion) = self.correlator.feed(&bytes) {
                    self.complete(completion).await;
                }
            }
            ProcessEvent::Stderr(bytes) => self.supervisor.append_stderr(&bytes),
            ProcessEvent::Exited(code) => {
                let report = self.supervisor.handle_exit(code);
                self.teardown(report);
            }
        }
    }

    async fn complete(&mut self, completion: Completion) {
        match self.queue.complete_in_flight() {
            Some(command) => {
                debug!(
                    "Received output for {}: {}",
                    command.text,
                    tail(&completion.body, LOG_TAIL_CHARS)
                );
                self.transcript.log(TranscriptEvent::new(
                    "response_received",
                    json!({
                        "command": command.text,
                        "response": completion.body,
                        "elapsed_ms": command.enqueued_at.elapsed().as_millis() as u64,
                    }),
                ));
                // The caller may have stopped waiting; that is fine
                let _ = command.reply.send(Ok(completion.body));
                self.try_dispatch().await;
            }
            None => {
                debug!("Reporting unexpected output");
                self.transcript.log(TranscriptEvent::new(
                    "unexpected_output",
                    json!({ "output": completion.raw }),
                ));
                self.listener.on_unexpected_output(&completion.raw);
            }
        }
    }

    /// The single place state is reset after a process death or spawn
    /// failure: pending work is flushed and termination reported.
    fn teardown(&mut self, report: ExitReport) {
        self.retry_at = None;
        self.correlator.reset();

        let pending = self.queue.drain();
        if !pending.is_empty() {
            info!(
                "Flushing {} pending command(s) after termination ({})",
                pending.len(),
                self.policy.on_terminate
            );
        }
        match self.policy.on_terminate {
            TerminationPolicy::FailPending => {
                for command in pending {
                    let _ = command.reply.send(Err(BridgeError::Terminated {
                        exit_code: report.exit_code,
                    }));
                }
            }
            TerminationPolicy::AbandonPending => {
                self.abandoned
                    .extend(pending.into_iter().map(|command| command.reply));
            }
        }

        self.publish_state();
        self.transcript.log(TranscriptEvent::new(
            "process_terminated",
            json!({ "exit_code": report.exit_code, "stderr": report.stderr }),
        ));
        self.listener.on_terminate(report.exit_code, &report.stderr);
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.supervisor.state().clone());
    }
}

async fn retry_timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Last `max_chars` characters of `text`.
fn tail(text: &str, max_chars: usize) -> &str {
    match text.char_indices().rev().nth(max_chars.saturating_sub(1)) {
        Some((start, _)) if max_chars > 0 => &text[start..],
        Some(_) => "",
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::tail;

    #[test]
    fn test_tail_respects_char_boundaries() {
        assert_eq!(tail("hello", 3), "llo");
        assert_eq!(tail("hi", 10), "hi");
        assert_eq!(tail("ééé", 2), "éé");
        assert_eq!(tail("abc", 0), "");
    }
}
