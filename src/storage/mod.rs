//! Key-value persistence behind a swappable backend.
//!
//! Every store that survives a session (favorites, listening history,
//! last-listened pointer) goes through a [`Storage`] handle. Payloads are
//! JSON strings; a payload that no longer parses is reported as absent
//! and logged, never surfaced to the caller as an error.
//!
//! # Keys
//!
//! ```text
//! favorites         # FavoritesLedger snapshot
//! listeningHistory  # per-episode progress records + completion history
//! lastListened      # pointer to the episode last selected or played
//! ```

pub mod file;
pub mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;

/// Storage key of the favorites ledger
pub const FAVORITES_KEY: &str = "favorites";

/// Storage key of the listening history
pub const LISTENING_HISTORY_KEY: &str = "listeningHistory";

/// Storage key of the last-listened pointer
pub const LAST_LISTENED_KEY: &str = "lastListened";

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Lock,
}

/// Raw string-keyed, string-valued durable store
pub trait StorageBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Read the raw payload stored under `key`
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the payload stored under `key`
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed JSON access to a shared backend
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl Storage {
    /// Wrap a backend
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Memory-only storage (nothing survives the process)
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Storage backed by a JSON file
    pub fn file(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(JsonFileBackend::new(path))
    }

    /// Access the underlying backend
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Read and decode the value under `key`.
    ///
    /// Missing keys, unreadable backends and malformed payloads all yield
    /// `None`; the latter two are logged.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, backend = self.backend.name(), "Failed to read stored value: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Ignoring malformed stored value: {}", e);
                None
            }
        }
    }

    /// Encode `value` and replace whatever is stored under `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set_raw(key, &json)
    }

    /// Delete `key`
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.backend.remove(key)
    }
}
