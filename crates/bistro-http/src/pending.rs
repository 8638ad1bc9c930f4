//! Requests suspended on an in-flight refresh.

use std::collections::VecDeque;

use tokio::sync::oneshot;

use bistro_core::AccessToken;
use bistro_core::error::AuthError;

/// What a refresh hands to everyone waiting on it.
pub(crate) type RefreshOutcome = Result<AccessToken, AuthError>;

type Continuation = Box<dyn FnOnce(RefreshOutcome) + Send>;

/// FIFO queue of continuations waiting on one refresh.
///
/// The queue is consumed whole by [`PendingQueue::settle`], so it is either
/// resolved or rejected in full and never partially drained.
#[derive(Default)]
pub(crate) struct PendingQueue {
    entries: VecDeque<Continuation>,
}

impl PendingQueue {
    pub fn push(&mut self, continuation: impl FnOnce(RefreshOutcome) + Send + 'static) {
        self.entries.push_back(Box::new(continuation));
    }

    /// Enqueue a waiter and return the receiving half.
    pub fn waiter(&mut self) -> oneshot::Receiver<RefreshOutcome> {
        let (tx, rx) = oneshot::channel();
        self.push(move |outcome| {
            // The waiter may have been dropped by its caller.
            let _ = tx.send(outcome);
        });
        rx
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Hand `outcome` to every entry in enqueue order.
    pub fn settle(self, outcome: RefreshOutcome) {
        for continuation in self.entries {
            continuation(outcome.clone());
        }
    }
}

impl std::fmt::Debug for PendingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingQueue")
            .field("len", &self.entries.len())
            .finish()
    }
}
