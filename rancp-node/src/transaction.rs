//! Bounded transaction manager for request/response exchanges.
//!
//! The manager hands out transaction ids from a fixed ring `[0, capacity)`.
//! An id stays reserved for the whole lifetime of its [`Transaction`] handle,
//! even after the response arrives, so a late or duplicate peer message can
//! never be matched against a recycled id. Completion only consumes the
//! response channel; the slot itself is freed when the handle is released.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;
use tracing::warn;

use crate::procedure_event::FrameworkCause;

pub type TransactionId = u16;

/// How an awaited transaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome<T> {
    /// The peer responded with `T`.
    Response(T),
    /// No response arrived before the deadline.
    Timeout,
    /// The transaction was cancelled before a response arrived.
    Cancelled,
}

struct ManagerInner<T> {
    /// Reserved ids. `Some(sender)` while awaiting completion, `None` once
    /// completed but not yet released.
    slots: HashMap<TransactionId, Option<oneshot::Sender<TransactionOutcome<T>>>>,
    cursor: TransactionId,
    capacity: usize,
    stopped: bool,
}

impl<T> ManagerInner<T> {
    fn allocate(&mut self) -> Option<TransactionId> {
        if self.slots.len() >= self.capacity {
            return None;
        }
        for _ in 0..self.capacity {
            let id = self.cursor;
            self.cursor = (self.cursor + 1) % self.capacity as TransactionId;
            if !self.slots.contains_key(&id) {
                return Some(id);
            }
        }
        None
    }

    fn complete(&mut self, id: TransactionId, outcome: TransactionOutcome<T>) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => match slot.take() {
                Some(tx) => {
                    let _ = tx.send(outcome);
                    true
                }
                None => false,
            },
            None => false,
        }
    }
}

/// Shared handle to the transaction table.
pub struct TransactionManager<T> {
    inner: Rc<RefCell<ManagerInner<T>>>,
    default_timeout: Duration,
}

impl<T> Clone for TransactionManager<T> {
    fn clone(&self) -> Self {
        TransactionManager {
            inner: Rc::clone(&self.inner),
            default_timeout: self.default_timeout,
        }
    }
}

impl<T> TransactionManager<T> {
    pub fn new(capacity: usize, default_timeout: Duration) -> Self {
        assert!(capacity > 0 && capacity <= TransactionId::MAX as usize);
        TransactionManager {
            inner: Rc::new(RefCell::new(ManagerInner {
                slots: HashMap::new(),
                cursor: 0,
                capacity,
                stopped: false,
            })),
            default_timeout,
        }
    }

    /// Opens a transaction with the default response timeout.
    ///
    /// Returns `None` when every id is reserved. On a stopped manager the
    /// returned handle is already cancelled.
    pub fn create_transaction(&self) -> Option<Transaction<T>> {
        self.create_transaction_with_timeout(self.default_timeout)
    }

    pub fn create_transaction_with_timeout(&self, timeout: Duration) -> Option<Transaction<T>> {
        let mut inner = self.inner.borrow_mut();
        if inner.stopped {
            return Some(Transaction::cancelled());
        }
        let id = inner.allocate()?;
        let (tx, rx) = oneshot::channel();
        inner.slots.insert(id, Some(tx));
        Some(Transaction {
            id: Some(id),
            manager: Rc::downgrade(&self.inner),
            pending: Some((rx, timeout)),
            outcome: None,
        })
    }

    /// Opens a transaction on a caller-chosen id, for exchanges where the
    /// correlation key is fixed by the protocol rather than allocated here.
    pub fn create_transaction_with_id(&self, id: TransactionId) -> Option<Transaction<T>> {
        let mut inner = self.inner.borrow_mut();
        if inner.stopped {
            return Some(Transaction::cancelled());
        }
        if inner.slots.contains_key(&id) || id as usize >= inner.capacity {
            return None;
        }
        let (tx, rx) = oneshot::channel();
        inner.slots.insert(id, Some(tx));
        Some(Transaction {
            id: Some(id),
            manager: Rc::downgrade(&self.inner),
            pending: Some((rx, self.default_timeout)),
            outcome: None,
        })
    }

    /// Delivers the peer response for `id`.
    ///
    /// Returns `false` for an unknown or already-completed transaction.
    pub fn set_response(&self, id: TransactionId, response: T) -> bool {
        self.inner
            .borrow_mut()
            .complete(id, TransactionOutcome::Response(response))
    }

    /// Cancels a single pending transaction.
    pub fn cancel_transaction(&self, id: TransactionId) -> bool {
        self.inner
            .borrow_mut()
            .complete(id, TransactionOutcome::Cancelled)
    }

    /// Cancels every pending transaction without stopping the manager.
    pub fn cancel_all(&self) {
        let mut inner = self.inner.borrow_mut();
        for slot in inner.slots.values_mut() {
            if let Some(tx) = slot.take() {
                let _ = tx.send(TransactionOutcome::Cancelled);
            }
        }
    }

    /// Cancels everything pending and rejects future transactions.
    pub fn stop(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.stopped = true;
        }
        self.cancel_all();
    }

    /// Number of currently reserved ids.
    pub fn active(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

/// Owned handle for one outstanding transaction.
///
/// The id stays reserved until the handle is released or dropped.
pub struct Transaction<T> {
    id: Option<TransactionId>,
    manager: Weak<RefCell<ManagerInner<T>>>,
    pending: Option<(oneshot::Receiver<TransactionOutcome<T>>, Duration)>,
    outcome: Option<TransactionOutcome<T>>,
}

impl<T> Transaction<T> {
    fn cancelled() -> Self {
        Transaction {
            id: None,
            manager: Weak::new(),
            pending: None,
            outcome: Some(TransactionOutcome::Cancelled),
        }
    }

    /// The reserved id, if this handle holds one.
    pub fn id(&self) -> Option<TransactionId> {
        self.id
    }

    /// Awaits the outcome, resolving to `Timeout` if the deadline passes.
    ///
    /// Idempotent: subsequent calls return the sealed outcome.
    pub async fn outcome(&mut self) -> &TransactionOutcome<T> {
        if self.outcome.is_none() {
            let (rx, timeout) = self.pending.take().expect("transaction state invariant");
            let outcome = match time::timeout(timeout, rx).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_closed)) => TransactionOutcome::Cancelled,
                Err(_elapsed) => {
                    self.seal_timeout();
                    TransactionOutcome::Timeout
                }
            };
            self.outcome = Some(outcome);
        }
        self.outcome.as_ref().expect("outcome just sealed")
    }

    /// Takes the manager-side sender so a late response cannot complete us.
    fn seal_timeout(&mut self) {
        if let (Some(id), Some(inner)) = (self.id, self.manager.upgrade()) {
            if let Some(slot) = inner.borrow_mut().slots.get_mut(&id) {
                slot.take();
            }
        }
    }

    /// True once the outcome is known.
    pub fn complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn has_response(&self) -> bool {
        matches!(self.outcome, Some(TransactionOutcome::Response(_)))
    }

    pub fn aborted(&self) -> bool {
        matches!(
            self.outcome,
            Some(TransactionOutcome::Timeout) | Some(TransactionOutcome::Cancelled)
        )
    }

    /// Why the transaction aborted. `None` while pending or on a response.
    pub fn failure_cause(&self) -> Option<FrameworkCause> {
        match self.outcome {
            Some(TransactionOutcome::Timeout) => Some(FrameworkCause::Timeout),
            Some(TransactionOutcome::Cancelled) => Some(FrameworkCause::Cancelled),
            _ => None,
        }
    }

    /// The peer response. Panics before completion or on a non-response end.
    pub fn response(&self) -> &T {
        match &self.outcome {
            Some(TransactionOutcome::Response(r)) => r,
            Some(_) => panic!("transaction ended without a response"),
            None => panic!("transaction response read before completion"),
        }
    }

    /// Frees the reserved id. Called automatically on drop.
    pub fn release(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(inner) = self.manager.upgrade() {
                let mut inner = inner.borrow_mut();
                if inner.slots.remove(&id).is_none() {
                    warn!(id, "released transaction id was not reserved");
                }
            }
        }
    }
}

impl<T> Drop for Transaction<T> {
    fn drop(&mut self) {
        self.release();
    }
}
