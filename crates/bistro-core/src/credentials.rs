//! Sign-in credentials.

use std::fmt;

/// Email and password used against the sign-in endpoint.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use bistro_core::Credentials;
///
/// let creds = Credentials::new("owner@example.com", "hunter22");
/// assert_eq!(creds.email(), "owner@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// Use this only when constructing the sign-in request body.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
