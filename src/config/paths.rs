//! Canonical paths for podshelf state.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use podshelf::config::paths;
//!
//! let storage = Storage::file(paths::storage_file()?);
//! ```
//!
//! | Location | Purpose |
//! |----------|---------|
//! | `$PODSHELF_HOME/storage.json` | Favorites, listening history, last listened |

use std::path::{Path, PathBuf};

use anyhow::Result;

/// File name of the persisted key/value store
pub const STORAGE_FILE: &str = "storage.json";

/// Get the podshelf home directory (~/.podshelf)
pub fn podshelf_home() -> Result<PathBuf> {
    crate::config::podshelf_home()
}

/// Get the storage file path (~/.podshelf/storage.json)
pub fn storage_file() -> Result<PathBuf> {
    Ok(storage_file_in(&podshelf_home()?))
}

/// Storage file inside an explicit home directory
pub fn storage_file_in(home: &Path) -> PathBuf {
    home.join(STORAGE_FILE)
}
