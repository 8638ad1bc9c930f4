//! Session plumbing for the CLI: file-backed credentials and a terminal
//! navigator.

pub mod navigator;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use bistro_core::CredentialStore;
use bistro_http::ApiSession;

use crate::cli::ClientArgs;
use navigator::TerminalNavigator;
use storage::FileStorage;

/// Open a session backed by the credentials file in the user's data directory.
pub fn open(args: &ClientArgs) -> Result<ApiSession> {
    let config = args.config()?;
    let storage = FileStorage::default_location().context("Failed to open credential storage")?;
    debug!(path = %storage.path().display(), "Using credential storage");
    let store = Arc::new(CredentialStore::new(Arc::new(storage)));

    ApiSession::new(config, store, Arc::new(TerminalNavigator)).context("Failed to create API client")
}
