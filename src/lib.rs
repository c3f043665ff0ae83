//! podshelf - client-side state engine for a podcast catalog
//!
//! Fetches shows, seasons and episodes from a remote catalog API, derives
//! filtered and sorted views of them, and keeps favorites and listening
//! progress in a persistent key/value store.
//!
//! # Architecture
//!
//! - `CatalogStore` caches the show list as an immutable snapshot that is
//!   swapped whole on every successful load
//! - `project` derives the visible show list from a snapshot and a view
//! - `FavoritesLedger` and `ProgressTracker` write every mutation through
//!   to `Storage` before returning
//! - `Browser` is the command surface tying them together
//!
//! # Modules
//!
//! - `catalog`: Catalog source trait, HTTP client, wire formats, cache
//! - `view`: Pure filter/sort projection
//! - `favorites`: Favorite episodes grouped by show
//! - `progress`: Playback positions, completions, playback sessions
//! - `storage`: String-keyed JSON persistence
//! - `core`: Browser command surface
//! - `domain`: Shows, seasons, episodes, genres, view state
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! podshelf shows --filter history --sort titleAsc
//!
//! # Where did I stop?
//! podshelf progress resume 10716 1
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod favorites;
pub mod progress;
pub mod storage;
pub mod view;

// Re-export main types at crate root for convenience
pub use catalog::{Catalog, CatalogSource, CatalogStore, FetchError, HttpCatalogSource, StalePolicy};
pub use core::Browser;
pub use domain::{Episode, EpisodeId, GenreFilter, GenreId, Season, SeasonId, Show, ShowId, SortKey, ViewState};
pub use favorites::{FavoriteEntry, FavoritesLedger};
pub use progress::{CompletionPolicy, PlaybackSession, ProgressKey, ProgressTracker};
pub use storage::{Storage, StorageError};
pub use view::project;
