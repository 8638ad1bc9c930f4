//! Forced sign-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use bistro_core::{CredentialStore, Navigator};

/// Ends a session that cannot be recovered.
///
/// Clears every stored credential, then hands control to the [`Navigator`].
/// Calling [`SessionTerminator::terminate`] again before a new session is
/// established does nothing.
pub struct SessionTerminator {
    store: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
    terminated: AtomicBool,
}

impl SessionTerminator {
    pub fn new(store: Arc<CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            terminated: AtomicBool::new(false),
        }
    }

    pub fn terminate(&self) {
        if self.terminated.swap(true, Ordering::AcqRel) {
            debug!("Session already terminated");
            return;
        }

        info!("Terminating session");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Credentials could not be fully cleared");
        }
        self.navigator.force_sign_in();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Allow the next failure to terminate again. Called once a new session
    /// has been established.
    pub(crate) fn rearm(&self) {
        self.terminated.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
