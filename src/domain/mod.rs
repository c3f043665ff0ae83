//! Domain types for the podshelf engine.
//!
//! This module contains the core data structures:
//! - Show, Season, Episode: the catalog hierarchy
//! - Genres: the fixed genre table and the genre filter
//! - ViewState: transient filter/sort selection

pub mod genre;
pub mod show;
pub mod view;

// Re-export commonly used types
pub use genre::{GenreFilter, GenreId, GENRES};
pub use show::{Episode, EpisodeId, Season, SeasonId, Seasons, Show, ShowId};
pub use view::{SortKey, ViewState};
