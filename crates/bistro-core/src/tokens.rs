//! Bearer token types.
//!
//! All three token kinds are opaque strings. They are never parsed, and their
//! values never appear in `Debug` output.

use std::fmt;

/// A short-lived access token attached to every protected request.
///
/// Replaced wholesale on every successful refresh.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the session. Never log this value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A longer-lived token used only against the refresh endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// A temporary token issued to an account that has not finished provisioning.
///
/// Held in memory only. Once provisioning completes it is promoted to an
/// [`AccessToken`] via [`SetupToken::promote`].
#[derive(Clone, PartialEq, Eq)]
pub struct SetupToken(String);

impl SetupToken {
    /// Create a new setup token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Turn this setup token into a regular access token.
    pub fn promote(self) -> AccessToken {
        AccessToken(self.0)
    }
}

impl fmt::Debug for SetupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SetupToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_token_hides_value_in_debug() {
        let token = RefreshToken::new("refresh_token_value_here");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("refresh_token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn setup_token_promotes_to_same_access_token() {
        let setup = SetupToken::new("setup-123");
        assert!(!format!("{:?}", setup).contains("setup-123"));
        assert_eq!(setup.promote(), AccessToken::new("setup-123"));
    }
}
