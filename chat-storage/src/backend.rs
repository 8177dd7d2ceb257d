//! Key-value backends: the string-to-string contract of browser local storage.
//!
//! [`FileStorage`] keeps every key in one JSON object on disk and rewrites it atomically
//! (temp file + rename). [`MemoryStorage`] is process-local and used in tests and as a
//! fallback when no path is configured.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use tracing::{debug, warn};

use crate::error::StorageError;

/// Sentinel key written and removed by the default availability check.
pub(crate) const PROBE_KEY: &str = "__localStorage_test__";

/// Default quota, matching the usual 5 MiB local-storage budget.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Synchronous string key-value store.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Whether writes can currently succeed. Defaults to writing and removing a sentinel key;
    /// backends with a cheaper check override it.
    fn check_available(&self) -> Result<(), StorageError> {
        self.set_item(PROBE_KEY, PROBE_KEY)?;
        self.remove_item(PROBE_KEY)
    }
}

/// In-memory store for testing and development.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("storage lock poisoned".to_string())
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

/// JSON-file backed store. Creates the parent directory and file on first write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    quota_bytes: usize,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            write_lock: Mutex::new(()),
        }
    }

    /// Caps the serialized size of the whole file; writes beyond it fail like a full local storage.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let serialized = serde_json::to_string_pretty(entries)?;
        if serialized.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed: serialized.len(),
                quota: self.quota_bytes,
            });
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(serialized.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), bytes = serialized.len(), "storage file written");
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.write_lock.lock().map_err(|_| poisoned())?;
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Storage file is corrupt, starting over"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        mutate(&mut entries);
        self.persist(&entries)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    /// Metadata-only: the directory can be created and an existing file is not read-only.
    /// A corrupt file still counts as available since the next write replaces it.
    fn check_available(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() || meta.permissions().readonly() => Err(
                StorageError::Unavailable(format!("{} is not writable", self.path.display())),
            ),
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
