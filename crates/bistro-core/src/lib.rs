//! bistro-core - Session types and credential storage for the bistro client.
//!
//! This crate holds everything the request coordinator needs that does not
//! touch the network: the token newtypes, account status, the unified error
//! type, client configuration and the [`CredentialStore`].

pub mod config;
pub mod credentials;
pub mod error;
pub mod navigator;
pub mod store;
pub mod tokens;
pub mod types;

pub use config::ClientConfig;
pub use credentials::Credentials;
pub use error::Error;
pub use navigator::{Navigator, NoopNavigator};
pub use store::{CredentialKey, CredentialStore, KeyValueStore, MemoryStorage};
pub use tokens::{AccessToken, RefreshToken, SetupToken};
pub use types::{AccountStatus, ApiUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
