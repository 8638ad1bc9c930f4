//! Forced sign-out in a terminal.

use bistro_core::Navigator;

use crate::output;

/// Tells the user their session is gone.
///
/// Credentials have already been removed from disk by the time this runs;
/// the command then fails with the refresh error and exits non-zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn force_sign_in(&self) {
        output::warning("Session expired. Sign in again with 'bistro auth login'.");
    }
}
