//! Event waiter
//!
//! Single-shot rendezvous for "the next event of kind K". The session holds
//! waiters in a list and gives each matching event to them; the party that
//! registered the waiter suspends in [`EventWaiter::wait`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::WaiterError;
use crate::events::{Event, EventKind};

type Outcome = Result<Arc<Event>, WaiterError>;

/// Waits for one event of a given kind
#[derive(Debug)]
pub struct EventWaiter {
    kind: EventKind,
    sender: Mutex<Option<oneshot::Sender<Outcome>>>,
    receiver: Mutex<Option<oneshot::Receiver<Outcome>>>,
}

impl EventWaiter {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            kind,
            sender: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Check whether this waiter is for `kind`
    #[inline]
    pub fn matches(&self, kind: EventKind) -> bool {
        self.kind == kind
    }

    /// Deliver `event` and wake the waiting party
    ///
    /// Returns `false` if the waiter was already resolved or closed; the event
    /// is then discarded.
    pub fn give(&self, event: Arc<Event>) -> bool {
        self.settle(Ok(event))
    }

    /// Resolve the waiter with a failure; a pending `wait` returns `Failed`
    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.settle(Err(WaiterError::Failed {
            kind: self.kind,
            reason: reason.into(),
        }))
    }

    fn settle(&self, outcome: Outcome) -> bool {
        match self.sender.lock().take() {
            Some(tx) => {
                // The receiving side may already be gone; the waiter still counts as resolved.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Tear the waiter down without a value; a pending `wait` fails with `Dropped`
    pub fn close(&self) {
        self.sender.lock().take();
    }

    /// Whether `give` or `close` has been called
    pub fn is_resolved(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Whether the waiting party gave up; a `wait` future was dropped
    pub fn is_abandoned(&self) -> bool {
        self.sender.lock().as_ref().is_some_and(oneshot::Sender::is_closed)
    }

    /// Suspend until an event is given
    pub async fn wait(&self) -> Result<Arc<Event>, WaiterError> {
        let rx = self
            .receiver
            .lock()
            .take()
            .ok_or(WaiterError::AlreadyAwaited(self.kind))?;

        rx.await.map_err(|_| WaiterError::Dropped(self.kind))?
    }
}
