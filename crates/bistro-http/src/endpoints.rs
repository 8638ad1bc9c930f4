//! Endpoint paths and request/response bodies for the dashboard API.

use serde::{Deserialize, Serialize};

use bistro_core::AccountStatus;

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const SIGN_IN: &str = "/api/auth/signin";
pub const SIGN_UP: &str = "/api/auth/signup";
pub const REFRESH: &str = "/api/auth/refresh";
pub const LOGOUT: &str = "/api/auth/logout";
pub const VERIFY_EMAIL: &str = "/api/auth/verify-email";
pub const RESEND_VERIFICATION: &str = "/api/auth/resend-verification";
pub const CREATE_ORGANIZATION: &str = "/api/auth/create-organization";
pub const FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";
/// Followed by the reset token as the last path segment.
pub const VERIFY_RESET_TOKEN: &str = "/api/auth/verify-reset-token/";
pub const CHANGE_PASSWORD: &str = "/api/auth/change-password";
pub const ACCOUNT: &str = "/api/account/";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from sign-in.
///
/// For `ORG_UNATTACHED` accounts the access token is really a setup token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from the refresh endpoint. Rotation of the refresh token is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyEmailRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VerifyEmailResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NameRequest<'a> {
    pub name: &'a str,
}

/// Response from create-organization. Servers may or may not issue a fresh pair.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrganizationResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Error body returned by the API.
///
/// Validation failures use an `errors` array instead of `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl ApiErrorResponse {
    /// The most useful human-readable message in the body.
    pub fn into_message(self) -> (Option<String>, Option<String>) {
        let message = self.message.or_else(|| {
            self.errors.into_iter().next().map(|first| match first {
                serde_json::Value::String(s) => s,
                other => other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string()),
            })
        });
        (self.error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sign_in_response_reads_status() {
        let response: SignInResponse = serde_json::from_value(json!({
            "accessToken": "a",
            "refreshToken": "r",
            "status": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(response.status, Some(AccountStatus::Active));
        assert_eq!(response.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn refresh_response_without_rotation() {
        let response: RefreshResponse =
            serde_json::from_value(json!({ "accessToken": "new" })).unwrap();
        assert_eq!(response.access_token, "new");
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn error_body_prefers_message() {
        let body: ApiErrorResponse = serde_json::from_value(json!({
            "message": "Invalid login credentials",
            "errors": ["ignored"]
        }))
        .unwrap();
        assert_eq!(
            body.into_message().1.as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn error_body_falls_back_to_first_error() {
        let body: ApiErrorResponse = serde_json::from_value(json!({
            "errors": [{ "message": "name is required" }, "second"]
        }))
        .unwrap();
        assert_eq!(body.into_message().1.as_deref(), Some("name is required"));
    }
}
