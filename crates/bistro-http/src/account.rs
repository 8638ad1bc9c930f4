//! Sign-in, onboarding and account maintenance.
//!
//! These flows decide which credential the client holds: an active account
//! gets a persisted access/refresh pair, an account that still has to set up
//! its business gets an in-memory setup token, and an unverified account
//! gets nothing until the email is confirmed.

use tracing::{debug, info, instrument, warn};

use bistro_core::error::{AuthError, InvalidInputError};
use bistro_core::{AccessToken, AccountStatus, Credentials, RefreshToken, Result, SetupToken};

use crate::endpoints::*;
use crate::request::ApiRequest;
use crate::session::ApiSession;

/// Result of a sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A full session was stored.
    Active,
    /// The account has no organization yet. A setup token is held in memory
    /// until [`ApiSession::create_organization`] succeeds.
    SetupRequired,
    /// The email must be verified first. A fresh code has been sent.
    VerificationRequired { email: String },
}

impl SignInOutcome {
    pub fn status(&self) -> AccountStatus {
        match self {
            SignInOutcome::Active => AccountStatus::Active,
            SignInOutcome::SetupRequired => AccountStatus::OrgUnattached,
            SignInOutcome::VerificationRequired { .. } => AccountStatus::UnverifiedEmail,
        }
    }
}

impl ApiSession {
    /// Sign in and store whichever credential the account status calls for.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<SignInOutcome> {
        info!("Signing in");

        let request = ApiRequest::post(SIGN_IN).json(&SignInRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;
        let response: SignInResponse = self.send(request).await?.json()?;

        let status = response.status.ok_or_else(|| AuthError::UnexpectedResponse {
            reason: "sign-in response has no status".into(),
        })?;
        debug!(%status, "Sign-in accepted");

        match status {
            AccountStatus::Active => {
                let access = response.access_token.ok_or_else(missing_access_token)?;
                self.establish(
                    &AccessToken::new(access),
                    response.refresh_token.map(RefreshToken::new).as_ref(),
                )?;
                info!("Session established");
                Ok(SignInOutcome::Active)
            }
            AccountStatus::OrgUnattached => {
                let token = response.access_token.ok_or_else(missing_access_token)?;
                self.store().clear_session()?;
                self.store().set_setup_token(SetupToken::new(token));
                info!("Account needs business setup");
                Ok(SignInOutcome::SetupRequired)
            }
            AccountStatus::UnverifiedEmail => {
                self.store().clear_session()?;
                self.resend_verification(credentials.email()).await?;
                info!("Account email is unverified");
                Ok(SignInOutcome::VerificationRequired {
                    email: credentials.email().to_string(),
                })
            }
        }
    }

    /// Register a new account. A verification code is emailed by the server.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let request = ApiRequest::post(SIGN_UP).json(&SignUpRequest {
            name,
            email,
            password,
        })?;
        self.send(request).await?;
        info!("Account created");
        Ok(())
    }

    /// Confirm an email with the emailed code.
    ///
    /// Returns true when the server issued a setup token, which is then held
    /// in memory for [`ApiSession::create_organization`].
    #[instrument(skip(self, code))]
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<bool> {
        let request = ApiRequest::post(VERIFY_EMAIL).json(&VerifyEmailRequest { email, code })?;
        let response = self.send(request).await?.json_value()?;
        let response: VerifyEmailResponse = if response.is_null() {
            VerifyEmailResponse::default()
        } else {
            serde_json::from_value(response)?
        };

        match response.token {
            Some(token) => {
                self.store().clear_session()?;
                self.store().set_setup_token(SetupToken::new(token));
                info!("Email verified, setup token issued");
                Ok(true)
            }
            None => {
                info!("Email verified");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        let request = ApiRequest::post(RESEND_VERIFICATION).json(&EmailRequest { email })?;
        self.send(request).await?;
        debug!("Verification code sent");
        Ok(())
    }

    /// Create the account's business and promote the setup token to a session.
    ///
    /// The setup token is kept if the call fails so it can be retried.
    #[instrument(skip(self))]
    pub async fn create_organization(&self, name: &str) -> Result<()> {
        let setup = self
            .store()
            .setup_token()
            .ok_or(AuthError::SetupTokenMissing)?;

        let request = ApiRequest::post(CREATE_ORGANIZATION)
            .json(&NameRequest { name })?
            .with_setup_token(setup.clone());
        let response = self.send(request).await?.json_value()?;
        let response: CreateOrganizationResponse = if response.is_object() {
            serde_json::from_value(response)?
        } else {
            CreateOrganizationResponse::default()
        };

        let access = match response.access_token {
            Some(token) => AccessToken::new(token),
            None => setup.promote(),
        };
        self.establish(&access, response.refresh_token.map(RefreshToken::new).as_ref())?;

        info!("Business created, session established");
        Ok(())
    }

    /// Sign out. The server call is best-effort; local credentials are
    /// always cleared.
    ///
    /// The server call is sent once and never refreshes, so an expired token
    /// neither terminates the session nor redirects to sign-in.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        info!("Logging out");

        if self.store().access_token()?.is_some()
            && let Err(e) = self.send_once(&ApiRequest::post(LOGOUT)).await
        {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }

        self.store().clear()
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = ApiRequest::post(FORGOT_PASSWORD).json(&EmailRequest { email })?;
        self.send(request).await?;
        Ok(())
    }

    /// Check whether a password reset token is still valid.
    #[instrument(skip(self, token))]
    pub async fn verify_reset_token(&self, token: &str) -> Result<bool> {
        let path = reset_token_path(token)?;
        match self.send(ApiRequest::get(path)).await {
            Ok(_) => Ok(true),
            Err(e) if e.status().is_some_and(|s| (400..500).contains(&s)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let request = ApiRequest::post(RESET_PASSWORD).json(&ResetPasswordRequest {
            token,
            new_password,
        })?;
        self.send(request).await?;
        info!("Password reset");
        Ok(())
    }

    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let request = ApiRequest::post(CHANGE_PASSWORD).json(&ChangePasswordRequest {
            old_password,
            new_password,
        })?;
        self.send(request).await?;
        info!("Password changed");
        Ok(())
    }

    /// The signed-in user's profile.
    pub async fn account(&self) -> Result<serde_json::Value> {
        self.send(ApiRequest::get(ACCOUNT)).await?.json_value()
    }

    pub async fn update_account(&self, name: &str) -> Result<serde_json::Value> {
        let request = ApiRequest::put(ACCOUNT).json(&NameRequest { name })?;
        self.send(request).await?.json_value()
    }
}

fn missing_access_token() -> AuthError {
    AuthError::UnexpectedResponse {
        reason: "sign-in response has no access token".into(),
    }
}

fn reset_token_path(token: &str) -> Result<String> {
    let valid = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(InvalidInputError::Other {
            message: "reset token contains characters that cannot appear in a URL path".into(),
        }
        .into());
    }
    Ok(format!("{}{}", VERIFY_RESET_TOKEN, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_maps_to_status() {
        assert_eq!(SignInOutcome::Active.status(), AccountStatus::Active);
        assert_eq!(
            SignInOutcome::SetupRequired.status(),
            AccountStatus::OrgUnattached
        );
        assert_eq!(
            SignInOutcome::VerificationRequired {
                email: "a@b.c".into()
            }
            .status(),
            AccountStatus::UnverifiedEmail
        );
    }

    #[test]
    fn reset_token_path_accepts_url_safe_tokens() {
        assert_eq!(
            reset_token_path("abc-123_x.y").unwrap(),
            "/api/auth/verify-reset-token/abc-123_x.y"
        );
    }

    #[test]
    fn reset_token_path_rejects_path_tricks() {
        assert!(reset_token_path("").is_err());
        assert!(reset_token_path("../account").is_err());
        assert!(reset_token_path("a?b=c").is_err());
    }
}
