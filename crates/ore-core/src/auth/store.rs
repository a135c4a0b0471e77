//! Key-value storage for cached sessions.
//!
//! The client only ever stores serialized `Session` values under the two
//! slot keys defined in `auth::session`, so the capability is kept to
//! string load/save/remove.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

/// Keychain service name for `KeyringStore`
const SERVICE_NAME: &str = "ore-client";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

/// String-keyed persistent slots.
pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a slot. Removing an absent slot is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store; sessions are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().map_err(|_| StoreError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// One JSON file per slot inside a cache directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.slot_path(key), value)?;
        debug!(slot = key, dir = ?self.dir, "Session written to disk");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// OS keychain, one credential per slot.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Use a custom keychain service name (e.g. one per Ore instance)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key)?)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for KeyringStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_slots() {
        let store = MemoryStore::new();
        assert_eq!(store.load("api_session").unwrap(), None);

        store.save("api_session", "one").unwrap();
        store.save("public_api_session", "two").unwrap();
        store.save("api_session", "three").unwrap();

        assert_eq!(store.load("api_session").unwrap().as_deref(), Some("three"));
        assert_eq!(store.load("public_api_session").unwrap().as_deref(), Some("two"));

        store.remove("api_session").unwrap();
        store.remove("api_session").unwrap();
        assert_eq!(store.load("api_session").unwrap(), None);
        assert!(store.load("public_api_session").unwrap().is_some());
    }

    #[test]
    fn test_file_store_round_trip() {
        let tmp = tempfile::tempdir().expect("Failed to create temp dir");
        // Directory does not exist yet; save must create it
        let store = FileStore::new(tmp.path().join("sessions"));

        assert_eq!(store.load("public_api_session").unwrap(), None);
        store.save("public_api_session", r#"{"session":"x"}"#).unwrap();
        assert_eq!(
            store.load("public_api_session").unwrap().as_deref(),
            Some(r#"{"session":"x"}"#)
        );
        assert!(tmp.path().join("sessions/public_api_session.json").exists());

        store.remove("public_api_session").unwrap();
        assert_eq!(store.load("public_api_session").unwrap(), None);
        // Idempotent
        store.remove("public_api_session").unwrap();
    }
}
