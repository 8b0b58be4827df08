//! Client storage adapter.
//!
//! Key/value persistence over JSON files in the configured state
//! directory, standing in for browser storage. Values are plain opaque
//! JSON with no schema versioning or expiry. Reads are best-effort: a
//! missing or unreadable entry degrades to `None` rather than erroring,
//! since everything stored here is a cache of server-owned state.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};

/// Storage key for the cached current-user record.
pub const USER_KEY: &str = "user";

/// Storage key for the bearer credential.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to serialize a value for storage
    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// Failed to write a value to disk
    #[error("Failed to write key '{key}': {source}")]
    Write { key: String, source: std::io::Error },
}

/// File-backed key/value store.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a value under a key, replacing any previous value.
    pub fn store_item<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let serialized = serde_json::to_vec(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })?;
        std::fs::write(self.path_for(key), serialized).map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }

    /// Read a value back, or `None` if it is absent or unreadable.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = std::fs::read(self.path_for(key)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                log::warn!("discarding unreadable cache entry '{key}': {error}");
                None
            }
        }
    }

    /// Delete a key. Deleting an absent key is not an error.
    pub fn remove_item(&self, key: &str) {
        if let Err(error) = std::fs::remove_file(self.path_for(key))
            && error.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("failed to remove cache entry '{key}': {error}");
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_storage(tag: &str) -> Storage {
        let rand_id: u32 = rand::random();
        let dir = std::env::temp_dir().join(format!("link_board_{tag}_{rand_id}"));
        Storage::new(dir)
    }

    #[test]
    fn store_and_get_roundtrip() {
        let storage = scratch_storage("roundtrip");
        storage.store_item(AUTH_TOKEN_KEY, &"abc".to_string()).unwrap();
        assert_eq!(
            storage.get_item::<String>(AUTH_TOKEN_KEY),
            Some("abc".to_string())
        );
        let _ = std::fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn missing_key_is_none() {
        let storage = scratch_storage("missing");
        assert_eq!(storage.get_item::<String>("nope"), None);
    }

    #[test]
    fn remove_is_idempotent() {
        let storage = scratch_storage("remove");
        storage.store_item("k", &1_i64).unwrap();
        storage.remove_item("k");
        storage.remove_item("k");
        assert_eq!(storage.get_item::<i64>("k"), None);
        let _ = std::fs::remove_dir_all(storage.dir());
    }

    #[test]
    fn corrupt_entry_degrades_to_none() {
        let storage = scratch_storage("corrupt");
        std::fs::create_dir_all(storage.dir()).unwrap();
        std::fs::write(storage.dir().join("user.json"), b"{not json").unwrap();
        assert_eq!(storage.get_item::<serde_json::Value>(USER_KEY), None);
        let _ = std::fs::remove_dir_all(storage.dir());
    }
}
