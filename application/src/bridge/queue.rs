//! Command queue with single-flight dispatch and a rate-limit floor.
//!
//! States, derived from the queue contents:
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Idle` | nothing queued, nothing in flight |
//! | `AwaitingDispatch` | head queued but not yet written (rate limit) |
//! | `InFlight` | head written, waiting for its prompt |
//!
//! The queue is a plain data structure: it never sleeps or writes. Callers
//! feed it the current time and act on the returned [`Dispatch`].

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// A command waiting for (or awaiting the result of) dispatch.
#[derive(Debug)]
pub struct PendingCommand<R> {
    pub text: String,
    pub enqueued_at: Instant,
    /// Completion handle, resolved exactly once by the owner of the queue
    pub reply: R,
}

impl<R> PendingCommand<R> {
    pub fn new(text: impl Into<String>, reply: R) -> Self {
        Self {
            text: text.into(),
            enqueued_at: Instant::now(),
            reply,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    AwaitingDispatch,
    InFlight,
}

/// What the owner should do after polling the queue.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Write this command text to the subprocess now.
    Write(String),
    /// The rate-limit floor has not elapsed; poll again at this instant.
    RetryAt(Instant),
    /// Nothing to dispatch (empty queue, or a command is already in flight).
    Nothing,
}

/// FIFO queue enforcing at most one command in flight.
#[derive(Debug)]
pub struct CommandQueue<R> {
    pending: VecDeque<PendingCommand<R>>,
    in_flight: bool,
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

impl<R> CommandQueue<R> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: false,
            min_interval,
            last_dispatch: None,
        }
    }

    /// Append a command at the tail. Duplicates are legal.
    pub fn enqueue(&mut self, command: PendingCommand<R>) {
        self.pending.push_back(command);
    }

    pub fn state(&self) -> QueueState {
        if self.in_flight {
            QueueState::InFlight
        } else if self.pending.is_empty() {
            QueueState::Idle
        } else {
            QueueState::AwaitingDispatch
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// Try to move the head command in flight.
    pub fn poll_dispatch(&mut self, now: Instant) -> Dispatch {
        if self.in_flight {
            return Dispatch::Nothing;
        }
        let Some(head) = self.pending.front() else {
            return Dispatch::Nothing;
        };

        if let Some(last) = self.last_dispatch {
            let ready_at = last + self.min_interval;
            if now < ready_at {
                return Dispatch::RetryAt(ready_at);
            }
        }

        self.in_flight = true;
        self.last_dispatch = Some(now);
        Dispatch::Write(head.text.clone())
    }

    /// Pop the in-flight command. Returns `None` when nothing is in flight,
    /// in which case the queue is left untouched.
    pub fn complete_in_flight(&mut self) -> Option<PendingCommand<R>> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        self.pending.pop_front()
    }

    /// Remove every pending command, in flight or not, and return to `Idle`.
    /// The rate-limit clock is kept so a quick relaunch still honours it.
    pub fn drain(&mut self) -> Vec<PendingCommand<R>> {
        self.in_flight = false;
        self.pending.drain(..).collect()
    }
}
