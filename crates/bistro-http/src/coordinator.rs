//! Single-flight refresh coordination.
//!
//! At most one refresh is outstanding at a time. The first request to see an
//! expired credential becomes the leader and runs the refresh; every request
//! that fails while it runs is queued and settled with the leader's outcome,
//! in the order it was queued.
//!
//! The in-flight flag is checked and set under a lock that is never held
//! across an `.await`, so admission is decided before any refresh I/O starts.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use bistro_core::error::AuthError;
use bistro_core::AccessToken;

use crate::pending::{PendingQueue, RefreshOutcome};

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug, Default)]
struct CoordinatorInner {
    refreshing: bool,
    // Bumped every time a refresh settles.
    generation: u64,
    pending: PendingQueue,
}

#[derive(Debug, Default)]
pub(crate) struct RefreshCoordinator {
    inner: Mutex<CoordinatorInner>,
}

/// How a request that saw an expired credential should proceed.
pub(crate) enum Admission<'a> {
    /// The stored token already differs from the one the request carried;
    /// replay with it, no refresh needed.
    Current(AccessToken),
    /// This request runs the refresh and must settle the lease.
    Leader(RefreshLease<'a>),
    /// A refresh is in flight; wait for its outcome.
    Queued(oneshot::Receiver<RefreshOutcome>),
}

impl RefreshCoordinator {
    pub fn state(&self) -> RefreshState {
        if self.lock().refreshing {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Snapshot to take before reading the stored token for [`Self::admit`].
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Decide how a request that failed with `stale` attached proceeds.
    ///
    /// `current` is the stored token, read after `observed` was taken from
    /// [`Self::generation`]. The store is never touched under the lock, so
    /// a slow backend cannot stall other requests here. Returns `None` when
    /// a refresh settled after `observed`; the caller reads the store again.
    pub fn admit(
        &self,
        stale: Option<&AccessToken>,
        current: Option<AccessToken>,
        observed: u64,
    ) -> Option<Admission<'_>> {
        let mut inner = self.lock();

        if inner.refreshing {
            let waiter = inner.pending.waiter();
            debug!(queued = inner.pending.len(), "Refresh in flight, queueing request");
            return Some(Admission::Queued(waiter));
        }

        if inner.generation != observed {
            return None;
        }

        if let Some(current) = current
            && stale != Some(&current)
        {
            debug!("Access token rotated since request was sent");
            return Some(Admission::Current(current));
        }

        inner.refreshing = true;
        Some(Admission::Leader(RefreshLease {
            coordinator: self,
            settled: false,
        }))
    }

    /// Clear the in-flight flag and settle everything that queued behind it.
    fn finish(&self, outcome: RefreshOutcome) {
        let pending = {
            let mut inner = self.lock();
            inner.refreshing = false;
            inner.generation = inner.generation.wrapping_add(1);
            std::mem::take(&mut inner.pending)
        };
        debug!(
            queued = pending.len(),
            success = outcome.is_ok(),
            "Settling queued requests"
        );
        pending.settle(outcome);
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the leader for the duration of a refresh.
///
/// Dropping it unsettled (the leader's future was cancelled) releases the
/// flag and rejects the queue with [`AuthError::RefreshAbandoned`].
pub(crate) struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    pub fn settle(mut self, outcome: RefreshOutcome) {
        self.settled = true;
        self.coordinator.finish(outcome);
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Refresh abandoned before completion");
            self.coordinator.finish(Err(AuthError::RefreshAbandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bistro_core::error::AuthError;

    fn admit<'a>(
        coordinator: &'a RefreshCoordinator,
        stale: Option<&str>,
        current: Option<&str>,
    ) -> Admission<'a> {
        let stale = stale.map(AccessToken::new);
        coordinator
            .admit(
                stale.as_ref(),
                current.map(AccessToken::new),
                coordinator.generation(),
            )
            .expect("no refresh settled in between")
    }

    fn leader(admission: Admission<'_>) -> RefreshLease<'_> {
        match admission {
            Admission::Leader(lease) => lease,
            _ => panic!("expected to lead the refresh"),
        }
    }

    fn queued(admission: Admission<'_>) -> oneshot::Receiver<RefreshOutcome> {
        match admission {
            Admission::Queued(rx) => rx,
            _ => panic!("expected to be queued"),
        }
    }

    #[test]
    fn first_failure_leads_and_the_rest_queue() {
        let coordinator = RefreshCoordinator::default();

        let lease = leader(admit(&coordinator, None, None));
        assert_eq!(coordinator.state(), RefreshState::Refreshing);

        let _a = queued(admit(&coordinator, None, None));
        let _b = queued(admit(&coordinator, None, None));
        assert_eq!(coordinator.pending_len(), 2);

        lease.settle(Ok(AccessToken::new("fresh")));
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test]
    async fn queued_requests_get_the_leader_outcome() {
        let coordinator = RefreshCoordinator::default();

        let lease = leader(admit(&coordinator, None, None));
        let a = queued(admit(&coordinator, None, None));
        let b = queued(admit(&coordinator, None, None));

        lease.settle(Err(AuthError::NoRefreshToken));

        assert_eq!(a.await.unwrap(), Err(AuthError::NoRefreshToken));
        assert_eq!(b.await.unwrap(), Err(AuthError::NoRefreshToken));
    }

    #[test]
    fn rotated_token_skips_refresh() {
        let coordinator = RefreshCoordinator::default();

        match admit(&coordinator, Some("old"), Some("new")) {
            Admission::Current(token) => assert_eq!(token, AccessToken::new("new")),
            _ => panic!("expected replay with current token"),
        }
        assert_eq!(coordinator.state(), RefreshState::Idle);
    }

    #[test]
    fn same_token_leads_refresh() {
        let coordinator = RefreshCoordinator::default();
        let lease = leader(admit(&coordinator, Some("old"), Some("old")));
        drop(lease);
    }

    #[test]
    fn refresh_settled_during_store_read_is_retried() {
        let coordinator = RefreshCoordinator::default();
        let observed = coordinator.generation();

        // Another request refreshes while this one is reading the store.
        let lease = leader(admit(&coordinator, None, None));
        lease.settle(Ok(AccessToken::new("new")));

        let old = AccessToken::new("old");
        assert!(
            coordinator
                .admit(Some(&old), Some(old.clone()), observed)
                .is_none()
        );
        assert_eq!(coordinator.state(), RefreshState::Idle);

        // A fresh read sees the refreshed token and replays with it.
        match admit(&coordinator, Some("old"), Some("new")) {
            Admission::Current(token) => assert_eq!(token, AccessToken::new("new")),
            _ => panic!("expected replay with current token"),
        }
    }

    #[tokio::test]
    async fn dropped_lease_releases_queue() {
        let coordinator = RefreshCoordinator::default();

        let lease = leader(admit(&coordinator, None, None));
        let waiter = queued(admit(&coordinator, None, None));

        drop(lease);

        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(waiter.await.unwrap(), Err(AuthError::RefreshAbandoned));
    }
}
