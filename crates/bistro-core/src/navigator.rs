//! Navigation seam used on forced sign-out.

/// The surface that takes the user back to sign-in.
///
/// Implementations must discard all client state tied to the old session,
/// not merely change what is displayed. A browser host performs a full page
/// load; a terminal host tells the user to sign in again and ends the
/// command.
pub trait Navigator: Send + Sync {
    /// Force navigation to the sign-in surface.
    fn force_sign_in(&self);
}

/// A navigator that does nothing. Useful for headless embedders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn force_sign_in(&self) {}
}
