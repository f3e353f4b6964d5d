//! JSON file-based key/value backend.
//!
//! All keys live in a single human-readable JSON document. Every mutation rewrites
//! the document with an atomic write (write-to-temp + rename), so the file is never
//! observed half-written, even if the process dies mid-save.
//!
//! A file that cannot be read or parsed is not fatal: the store opens empty and the
//! next successful write replaces the bad file.

use crate::domain::error::{GigscoutError, Result};
use crate::storage::backend::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// JSON storage container format.
///
/// ```json
/// {
///   "version": 1,
///   "entries": {
///     "favouriteEventIDs": "[\"vvG1zZ9\"]",
///     "lastSearch": "{\"cityName\":\"Austin\",\"latitude\":null,\"longitude\":null}"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    version: u32,

    #[serde(default)]
    entries: BTreeMap<String, String>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// JSON file storage backend.
///
/// The whole document is cached in memory and flushed to disk on every change.
/// Interior locking makes the store `Sync`, so one instance can back both the
/// favourites store and the last-search store.
pub struct JsonFileStore {
    file_path: PathBuf,
    data: Mutex<StorageData>,
}

impl JsonFileStore {
    /// Opens (or creates) the store at `file_path`.
    ///
    /// Parent directories are created automatically. An unreadable or corrupt file
    /// is logged and treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the parent directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gigscout::storage::JsonFileStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonFileStore::open(PathBuf::from("/tmp/gigscout/state.json"))?;
    /// # Ok::<(), gigscout::GigscoutError>(())
    /// ```
    pub fn open(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "opening JSON store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path).unwrap_or_else(|e| {
                tracing::warn!(
                    path = ?file_path,
                    error = %e,
                    "store file unreadable, starting empty"
                );
                StorageData::default()
            })
        } else {
            tracing::debug!("initializing new empty store");
            StorageData::default()
        };

        tracing::debug!(entry_count = data.entries.len(), "JSON store opened");

        Ok(Self {
            file_path,
            data: Mutex::new(data),
        })
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| GigscoutError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version != FORMAT_VERSION {
            return Err(GigscoutError::Storage(format!(
                "unsupported store version {}",
                data.version
            )));
        }

        Ok(data)
    }

    /// Writes the document to a temporary sibling file, then renames it into place.
    fn save_to_file(&self, data: &StorageData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| GigscoutError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!(path = ?self.file_path, "store saved");
        Ok(())
    }

    /// Applies `change` to a copy of the document and saves it.
    ///
    /// The cached document is replaced only after the save succeeds, so a failed
    /// write leaves memory matching the file. `change` returns `false` when it
    /// left the copy untouched, which skips the write.
    fn commit(&self, change: impl FnOnce(&mut StorageData) -> bool) -> Result<()> {
        let mut data = self.lock()?;

        let mut next = data.clone();
        if !change(&mut next) {
            tracing::trace!("skipping save, nothing changed");
            return Ok(());
        }

        self.save_to_file(&next)?;
        *data = next;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StorageData>> {
        self.data
            .lock()
            .map_err(|_| GigscoutError::Storage("store lock poisoned".to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_many(&[(key, value)])
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let _span = tracing::debug_span!("json_store_set", key_count = entries.len()).entered();

        self.commit(|data| {
            let mut changed = false;
            for &(key, value) in entries {
                if data.entries.get(key).map(String::as_str) != Some(value) {
                    data.entries.insert(key.to_string(), value.to_string());
                    changed = true;
                }
            }
            changed
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _span = tracing::debug_span!("json_store_remove", key = %key).entered();

        self.commit(|data| data.entries.remove(key).is_some())
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("file_path", &self.file_path)
            .finish_non_exhaustive()
    }
}
