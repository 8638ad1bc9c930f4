//! Account provisioning status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provisioning status asserted by the server at sign-in.
///
/// Decides which credential the caller should hold: `Active` accounts get a
/// persisted access/refresh pair, `OrgUnattached` accounts get a setup token
/// only, and `UnverifiedEmail` accounts get nothing until the email is
/// confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    UnverifiedEmail,
    OrgUnattached,
    Active,
}

impl AccountStatus {
    /// Wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::UnverifiedEmail => "UNVERIFIED_EMAIL",
            AccountStatus::OrgUnattached => "ORG_UNATTACHED",
            AccountStatus::Active => "ACTIVE",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
