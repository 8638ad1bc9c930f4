//! bistro-http - Authenticated request coordinator for the bistro dashboard API.
//!
//! Every call goes through an [`ApiSession`]. Protected endpoints carry the
//! stored access token; when it expires the session refreshes it once,
//! however many calls failed together, and replays each of them a single
//! time. An unrecoverable refresh clears the credentials and sends the user
//! back to sign-in.
//!
//! # Example
//!
//! ```no_run
//! use bistro_http::{ApiSession, ApiUrl, ClientConfig, Credentials, SignInOutcome};
//!
//! # async fn example() -> Result<(), bistro_http::Error> {
//! let session = ApiSession::in_memory(ClientConfig::new(ApiUrl::new("https://pos.example.com")?))?;
//!
//! match session.sign_in(&Credentials::new("owner@example.com", "hunter22")).await? {
//!     SignInOutcome::Active => {}
//!     SignInOutcome::SetupRequired => session.create_organization("Cafe Nova").await?,
//!     SignInOutcome::VerificationRequired { email } => {
//!         println!("check {email} for a verification code");
//!         return Ok(());
//!     }
//! }
//!
//! let account = session.account().await?;
//! println!("{account}");
//! # Ok(())
//! # }
//! ```

mod account;
mod classify;
mod client;
mod coordinator;
mod decorate;
pub mod endpoints;
mod pending;
mod request;
mod session;
mod terminator;

pub use account::SignInOutcome;
pub use classify::{RequestClass, classify, is_exempt};
pub use coordinator::RefreshState;
pub use request::{ApiRequest, ApiResponse, Method};
pub use session::ApiSession;
pub use terminator::SessionTerminator;

// Re-export the core types callers need alongside a session
pub use bistro_core::{
    AccessToken, AccountStatus, ApiUrl, ClientConfig, CredentialStore, Credentials, Error,
    KeyValueStore, MemoryStorage, Navigator, NoopNavigator, RefreshToken, Result, SetupToken,
};
