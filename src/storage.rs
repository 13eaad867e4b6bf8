//! Local key-value storage for preferences and the session flag.
//!
//! Values are plain strings, matching the browser-storage contract the
//! EchoMind web front end uses, so a storage file can be shared or migrated
//! between front ends.

use crate::error::{ClientError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage keys.
pub mod keys {
    pub const TTS_ENABLED: &str = "ttsEnabled";
    /// Legacy boolean mirror of [`THEME`].
    pub const DARK_MODE: &str = "darkMode";
    pub const THEME: &str = "theme";
    pub const ACTIVE_TAB: &str = "activeTab";
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    pub const CURRENT_USER: &str = "currentUser";
    pub const LANGUAGE: &str = "language";
    pub const TEMPERATURE: &str = "temperature";
}

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;

    /// Read a `"true"`/`"false"` flag.
    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Write a flag in the form [`get_bool`](Self::get_bool) reads.
    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }
}

/// In-memory store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

/// JSON-file-backed store. Every write rewrites the file atomically
/// (temp file + rename).
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or not a JSON
    /// object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ClientError::Storage(format!("invalid storage file {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened storage file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| ClientError::Storage(format!("failed to serialize storage: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

/// Write a key and log instead of failing; local storage errors never block
/// the UI update that triggered them.
pub(crate) fn store_or_warn(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value) {
        tracing::warn!(key, error = %e, "failed to persist local setting");
    }
}

pub(crate) fn store_bool_or_warn(store: &dyn KeyValueStore, key: &str, value: bool) {
    if let Err(e) = store.set_bool(key, value) {
        tracing::warn!(key, error = %e, "failed to persist local setting");
    }
}

pub(crate) fn remove_or_warn(store: &dyn KeyValueStore, key: &str) {
    if let Err(e) = store.remove(key) {
        tracing::warn!(key, error = %e, "failed to remove local setting");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get(keys::THEME).is_none());
        store.set(keys::THEME, "dark").unwrap();
        assert_eq!(store.get(keys::THEME).as_deref(), Some("dark"));
        store.remove(keys::THEME).unwrap();
        assert!(store.get(keys::THEME).is_none());
    }

    #[test]
    fn bool_helpers_reject_garbage() {
        let store = MemoryStore::new();
        store.set_bool(keys::TTS_ENABLED, true).unwrap();
        assert_eq!(store.get_bool(keys::TTS_ENABLED), Some(true));
        store.set(keys::TTS_ENABLED, "yes").unwrap();
        assert_eq!(store.get_bool(keys::TTS_ENABLED), None);
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("storage.json");

        let store = FileStore::open(&path).unwrap();
        store.set(keys::ACTIVE_TAB, "insights").unwrap();
        store.set(keys::CURRENT_USER, "sam").unwrap();
        store.remove(keys::CURRENT_USER).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(keys::ACTIVE_TAB).as_deref(), Some("insights"));
        assert!(reopened.get(keys::CURRENT_USER).is_none());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(ClientError::Storage(_))
        ));
    }

    #[test]
    fn file_store_treats_empty_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert!(store.get(keys::THEME).is_none());
    }
}
