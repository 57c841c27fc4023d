//! Scan serialization queue
//!
//! A FIFO mutex with cooperative wakeups. Every decoded QR code that passes
//! validation registers an entry and waits for its turn; only the head of the
//! queue may talk to the backend. There is no priority, timeout or retry, and
//! cancellation rejects everyone currently waiting.
//!
//! Each waiting entry owns a oneshot receiver; the queue keeps the sender and
//! fires it when the entry becomes the head (`done`) or when the queue is
//! flushed. Dropping the queue drops every sender, which waiters observe as a
//! stop.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

/// Identifier of one in-flight scan-to-receipt attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueId(Uuid);

impl QueueId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Couldn't register in queue, it's blocked")]
    Blocked,

    #[error("Couldn't finish {0}, it isn't the active entry")]
    NotActive(QueueId),

    #[error("Queue has been stopped")]
    Stopped,

    #[error("{0} is not queued")]
    NotQueued(QueueId),
}

#[derive(Debug)]
enum Signal {
    Turn,
    Stop,
}

#[derive(Debug)]
struct Entry {
    id: QueueId,
    wakeup: Option<oneshot::Sender<Signal>>,
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<Entry>,
    blocked: bool,
}

/// FIFO queue granting one turn at a time
#[derive(Debug, Default)]
pub struct ScanQueue {
    state: Mutex<QueueState>,
}

impl ScanQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue that rejects registrations until `unblock`
    pub fn blocked() -> Self {
        let queue = Self::new();
        queue.block();
        queue
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // State stays consistent across panics: every mutation is a single
        // VecDeque/bool operation.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a new entry at the tail
    pub fn register(&self) -> Result<QueueId, QueueError> {
        let mut state = self.lock();
        if state.blocked {
            return Err(QueueError::Blocked);
        }

        let id = QueueId::new();
        state.entries.push_back(Entry { id, wakeup: None });
        debug!(queue_id = %id, position = state.entries.len(), "queue: registered");
        Ok(id)
    }

    /// Wait until `id` is the head of the queue
    ///
    /// Resolves immediately when `id` already is the head. Fails with
    /// `Stopped` when the queue is flushed (or dropped) while waiting.
    pub async fn wait_turn(&self, id: QueueId) -> Result<(), QueueError> {
        let receiver = {
            let mut state = self.lock();

            if state.entries.front().map(|e| e.id) == Some(id) {
                debug!(queue_id = %id, "queue: turn");
                return Ok(());
            }

            let entry = state
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(QueueError::NotQueued(id))?;

            let (sender, receiver) = oneshot::channel();
            entry.wakeup = Some(sender);
            debug!(queue_id = %id, "queue: awaiting turn");
            receiver
        };

        match receiver.await {
            Ok(Signal::Turn) => {
                debug!(queue_id = %id, "queue: turn");
                Ok(())
            }
            Ok(Signal::Stop) | Err(_) => {
                debug!(queue_id = %id, "queue: stopped while waiting");
                Err(QueueError::Stopped)
            }
        }
    }

    /// Finish the head entry and wake the next one
    pub fn done(&self, id: QueueId) -> Result<(), QueueError> {
        let mut state = self.lock();

        if state.entries.front().map(|e| e.id) != Some(id) {
            return Err(QueueError::NotActive(id));
        }

        state.entries.pop_front();
        debug!(queue_id = %id, "queue: done");

        if let Some(next) = state.entries.front_mut() {
            if let Some(wakeup) = next.wakeup.take() {
                // The waiter may have gone away; it then simply never runs.
                let _ = wakeup.send(Signal::Turn);
            }
        }

        Ok(())
    }

    /// Cancel every entry and empty the queue
    pub fn stop_and_flush(&self) {
        let mut state = self.lock();
        let flushed = state.entries.len();

        for entry in state.entries.drain(..) {
            if let Some(wakeup) = entry.wakeup {
                let _ = wakeup.send(Signal::Stop);
            }
        }

        debug!(flushed, "queue: stop");
    }

    /// Reject new registrations
    pub fn block(&self) {
        self.lock().blocked = true;
    }

    /// Accept new registrations again
    pub fn unblock(&self) {
        self.lock().blocked = false;
    }

    pub fn is_blocked(&self) -> bool {
        self.lock().blocked
    }

    /// The entry currently holding the turn
    pub fn active(&self) -> Option<QueueId> {
        self.lock().entries.front().map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Number of entries suspended in `wait_turn`
    pub fn waiting(&self) -> usize {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.wakeup.as_ref().is_some_and(|w| !w.is_closed()))
            .count()
    }
}
