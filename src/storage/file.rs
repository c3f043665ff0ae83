//! JSON-file storage backend.
//!
//! The whole store is one JSON object mapping key -> raw payload string.
//! Writers serialize on an exclusive lock over a sidecar `.lock` file, write
//! the new object to a temp file in the same directory and rename it over
//! the target. Readers hold a shared lock on the sidecar, so they always see
//! a complete object.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::warn;

use super::{StorageBackend, StorageError};

/// File-backed key-value store (`~/.podshelf/storage.json` by default)
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn open_lock(&self) -> Result<File, StorageError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        Ok(file)
    }

    /// Decode the file contents; an unreadable object is treated as empty
    fn parse_entries(&self, content: &str) -> BTreeMap<String, String> {
        if content.trim().is_empty() {
            return BTreeMap::new();
        }

        match serde_json::from_str(content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "Storage file is malformed, starting empty: {}", e);
                BTreeMap::new()
            }
        }
    }

    /// Current entries; caller holds the sidecar lock
    fn load_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(self.parse_entries(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let lock = self.open_lock()?;
        lock.lock_shared()?;
        let result = self.load_entries();
        let unlocked = FileExt::unlock(&lock);

        let entries = result?;
        unlocked?;
        Ok(entries)
    }

    /// Apply `update` to the stored entries while holding the exclusive lock
    fn modify<F>(&self, update: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let lock = self.open_lock()?;
        lock.lock_exclusive()?;
        let result = self.replace_locked(update);
        let unlocked = FileExt::unlock(&lock);

        result?;
        unlocked?;
        Ok(())
    }

    fn replace_locked<F>(&self, update: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.load_entries()?;
        update(&mut entries);

        let json = serde_json::to_string_pretty(&entries)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(json.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

impl StorageBackend for JsonFileBackend {
    fn name(&self) -> &str {
        "json-file"
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        self.modify(|entries| {
            entries.remove(key);
        })
    }
}
