//! File-backed credential storage.
//!
//! Tokens live in a small JSON object keyed like browser storage
//! (`accessToken`, `refreshToken`). The setup token is never written here.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use directories::ProjectDirs;

use bistro_core::error::StorageError;
use bistro_core::{CredentialKey, KeyValueStore, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Storage at `<data dir>/credentials.json`.
    pub fn default_location() -> anyhow::Result<Self> {
        let dirs =
            ProjectDirs::from("", "", "bistro").context("Could not determine data directory")?;

        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;

        Ok(Self::new(data_dir.join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Entries> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&json).map_err(|e| {
            bistro_core::Error::from(StorageError::Corrupt {
                message: format!("{}: {}", self.path.display(), e),
            })
        })
    }

    fn write(&self, entries: &Entries) -> Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(self.io_error(e)),
                _ => Ok(()),
            };
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&self.path, perms).map_err(|e| self.io_error(e))?;
        }

        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut Entries)) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read()?;
        f(&mut entries);
        self.write(&entries)
    }

    fn io_error(&self, source: io::Error) -> bistro_core::Error {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
        .into()
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read()?.remove(key.as_str()))
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<()> {
        self.update(|entries| {
            entries.remove(key.as_str());
        })
    }
}
