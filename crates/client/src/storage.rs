//! Credential storage
//!
//! The client reads and writes two named string slots. Where they live is up
//! to the embedding application: [`MemoryStore`] keeps them for the lifetime
//! of the process, [`FileStore`] persists them as a JSON object on disk.

use crate::config::StorageKeys;
use crate::error::StorageError;
use crate::types::TokenPair;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

type StoreResult<T> = Result<T, StorageError>;

/// Durable key/value storage for the credential pair
pub trait CredentialStore: Send + Sync {
    /// Read a slot
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a slot, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Erase a slot; erasing a missing slot is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    fn access_token(&self) -> StoreResult<Option<String>> {
        self.get(StorageKeys::ACCESS_TOKEN)
    }

    fn refresh_token(&self) -> StoreResult<Option<String>> {
        self.get(StorageKeys::REFRESH_TOKEN)
    }

    fn store_access(&self, access: &str) -> StoreResult<()> {
        self.set(StorageKeys::ACCESS_TOKEN, access)
    }

    fn store_pair(&self, pair: &TokenPair) -> StoreResult<()> {
        self.set(StorageKeys::ACCESS_TOKEN, &pair.access)?;
        self.set(StorageKeys::REFRESH_TOKEN, &pair.refresh)
    }

    /// Erase both slots. Both removals are attempted even if the first fails.
    fn clear(&self) -> StoreResult<()> {
        let access = self.remove(StorageKeys::ACCESS_TOKEN);
        let refresh = self.remove(StorageKeys::REFRESH_TOKEN);
        access.and(refresh)
    }
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a credential pair
    pub fn with_pair(pair: &TokenPair) -> Self {
        let store = Self::new();
        if let Ok(mut slots) = store.slots.write() {
            slots.insert(StorageKeys::ACCESS_TOKEN.to_string(), pair.access.clone());
            slots.insert(StorageKeys::REFRESH_TOKEN.to_string(), pair.refresh.clone());
        }
        store
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let slots = self.slots.read().map_err(|_| StorageError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut slots = self.slots.write().map_err(|_| StorageError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// Credential store backed by a JSON object on disk
///
/// Every operation re-reads the file so that several processes sharing the
/// same path observe each other's writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn load(&self) -> StoreResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|source| StorageError::Encoding {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let content = serde_json::to_string_pretty(slots).map_err(|source| {
            StorageError::Encoding {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        // Write beside the target and rename so readers never see a partial file
        let staging = self.staging_path();
        std::fs::write(&staging, content).map_err(|e| self.io_error(e))?;

        // Owner read/write only, the file holds bearer credentials
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&staging, permissions).map_err(|e| self.io_error(e))?;
        }

        std::fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> StoreResult<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut slots = self.load()?;
        apply(&mut slots);
        self.save(&slots)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.update(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.update(|slots| {
            slots.remove(key);
        })
    }
}
