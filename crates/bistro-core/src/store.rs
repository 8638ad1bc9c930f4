//! Credential storage.
//!
//! [`KeyValueStore`] is the durable backend (browser storage, a file, a
//! keychain). [`CredentialStore`] wraps one and adds the in-memory slot for
//! the setup token, which is never persisted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::Result;
use crate::tokens::{AccessToken, RefreshToken, SetupToken};

/// The two durable credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    /// Storage key used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
        }
    }
}

/// Durable key/value storage that survives a restart of the host.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<()>;
    fn remove(&self, key: CredentialKey) -> Result<()>;
}

/// In-memory [`KeyValueStore`]. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&key);
        Ok(())
    }
}

/// Get/set/clear access for the access, refresh and setup tokens.
///
/// Pure storage: deciding when a token is written or cleared is up to the
/// caller.
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
    setup: RwLock<Option<SetupToken>>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            setup: RwLock::new(None),
        }
    }

    /// A store backed by [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .backend
            .get(CredentialKey::AccessToken)?
            .map(AccessToken::new))
    }

    pub fn set_access_token(&self, token: &AccessToken) -> Result<()> {
        self.backend.set(CredentialKey::AccessToken, token.as_str())
    }

    pub fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .backend
            .get(CredentialKey::RefreshToken)?
            .map(RefreshToken::new))
    }

    pub fn set_refresh_token(&self, token: &RefreshToken) -> Result<()> {
        self.backend.set(CredentialKey::RefreshToken, token.as_str())
    }

    /// Replace the durable pair wholesale. A `None` refresh token removes any
    /// previously stored one.
    pub fn store_session(&self, access: &AccessToken, refresh: Option<&RefreshToken>) -> Result<()> {
        self.set_access_token(access)?;
        match refresh {
            Some(refresh) => self.set_refresh_token(refresh),
            None => self.backend.remove(CredentialKey::RefreshToken),
        }
    }

    /// Remove both durable slots.
    ///
    /// Both removals are attempted even if the first fails; the first error
    /// is returned.
    pub fn clear_session(&self) -> Result<()> {
        let access = self.backend.remove(CredentialKey::AccessToken);
        let refresh = self.backend.remove(CredentialKey::RefreshToken);
        debug!("Cleared stored session credentials");
        access.and(refresh)
    }

    pub fn setup_token(&self) -> Option<SetupToken> {
        self.setup
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_setup_token(&self, token: SetupToken) {
        *self.setup.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn take_setup_token(&self) -> Option<SetupToken> {
        self.setup
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn clear_setup_token(&self) {
        self.take_setup_token();
    }

    /// Remove every credential, durable and in-memory.
    pub fn clear(&self) -> Result<()> {
        self.clear_setup_token();
        self.clear_session().inspect_err(|e| {
            warn!(error = %e, "Failed to clear stored credentials");
        })
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_no_tokens() {
        let store = CredentialStore::in_memory();
        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
        assert!(store.setup_token().is_none());
    }

    #[test]
    fn store_session_replaces_pair() {
        let store = CredentialStore::in_memory();
        store
            .store_session(
                &AccessToken::new("a1"),
                Some(&RefreshToken::new("r1")),
            )
            .unwrap();
        assert_eq!(store.access_token().unwrap(), Some(AccessToken::new("a1")));
        assert_eq!(store.refresh_token().unwrap(), Some(RefreshToken::new("r1")));

        store.store_session(&AccessToken::new("a2"), None).unwrap();
        assert_eq!(store.access_token().unwrap(), Some(AccessToken::new("a2")));
        assert!(store.refresh_token().unwrap().is_none());
    }

    #[test]
    fn setup_token_is_not_persisted() {
        let backend = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(backend.clone());
        store.set_setup_token(SetupToken::new("setup"));

        assert_eq!(store.setup_token(), Some(SetupToken::new("setup")));
        assert!(backend.get(CredentialKey::AccessToken).unwrap().is_none());

        // A fresh wrapper over the same backend does not see it.
        let reopened = CredentialStore::new(backend);
        assert!(reopened.setup_token().is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let store = CredentialStore::in_memory();
        store
            .store_session(&AccessToken::new("a"), Some(&RefreshToken::new("r")))
            .unwrap();
        store.set_setup_token(SetupToken::new("s"));

        store.clear().unwrap();

        assert!(store.access_token().unwrap().is_none());
        assert!(store.refresh_token().unwrap().is_none());
        assert!(store.setup_token().is_none());
    }

    #[test]
    fn take_setup_token_empties_slot() {
        let store = CredentialStore::in_memory();
        store.set_setup_token(SetupToken::new("s"));
        assert_eq!(store.take_setup_token(), Some(SetupToken::new("s")));
        assert!(store.take_setup_token().is_none());
    }

    #[test]
    fn debug_output_is_redacted() {
        let store = CredentialStore::in_memory();
        store.set_access_token(&AccessToken::new("secret-access")).unwrap();
        assert!(!format!("{:?}", store).contains("secret-access"));
    }
}
