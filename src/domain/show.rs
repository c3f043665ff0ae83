//! Show / season / episode hierarchy.
//!
//! These are the normalized shapes the rest of the crate works with. Wire
//! formats are handled in `catalog::wire` and converted into these types.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::genre::GenreId;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the raw string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Show identifier (opaque string assigned by the catalog API)
    ShowId
);
string_id!(
    /// Season identifier, unique within its show
    SeasonId
);
string_id!(
    /// Episode identifier
    EpisodeId
);

impl SeasonId {
    /// Season id derived from a 1-based season number
    pub fn from_number(number: u32) -> Self {
        Self(number.to_string())
    }

    /// Season number, if this id was derived from one
    pub fn number(&self) -> Option<u32> {
        self.0.parse().ok()
    }
}

impl EpisodeId {
    /// Episode id derived from its position in the catalog
    pub fn derive(show_id: &ShowId, season_number: u32, episode_number: u32) -> Self {
        Self(format!("{}-{}-{}", show_id, season_number, episode_number))
    }
}

/// A show in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: ShowId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub genre_ids: BTreeSet<GenreId>,
    pub seasons: Seasons,
    /// Last update reported by the catalog; `None` when unknown or unparseable
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Seasons of a show: a bare count in list previews, expanded in detail views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seasons {
    Count(u32),
    Expanded(Vec<Season>),
}

impl Default for Seasons {
    fn default() -> Self {
        Seasons::Count(0)
    }
}

impl Seasons {
    /// Number of seasons regardless of expansion
    pub fn count(&self) -> usize {
        match self {
            Seasons::Count(n) => *n as usize,
            Seasons::Expanded(seasons) => seasons.len(),
        }
    }

    /// Expanded seasons, empty for a bare count
    pub fn as_slice(&self) -> &[Season] {
        match self {
            Seasons::Count(_) => &[],
            Seasons::Expanded(seasons) => seasons,
        }
    }
}

impl Show {
    /// Create a preview show with no seasons
    pub fn new(id: impl Into<ShowId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            image: None,
            genre_ids: BTreeSet::new(),
            seasons: Seasons::default(),
            updated_at: None,
        }
    }

    /// Set the update timestamp
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Add a genre
    pub fn with_genre(mut self, genre: GenreId) -> Self {
        self.genre_ids.insert(genre);
        self
    }

    /// Replace the seasons with an expanded list
    pub fn with_seasons(mut self, seasons: Vec<Season>) -> Self {
        self.seasons = Seasons::Expanded(seasons);
        self
    }

    /// Whether seasons (and their episodes) are present
    pub fn is_expanded(&self) -> bool {
        matches!(self.seasons, Seasons::Expanded(_))
    }

    /// Find an expanded season by id
    pub fn season(&self, id: &SeasonId) -> Option<&Season> {
        self.seasons.as_slice().iter().find(|s| &s.id == id)
    }

    /// Find an episode anywhere in the expanded seasons
    pub fn episode(&self, id: &EpisodeId) -> Option<(&Season, &Episode)> {
        self.seasons
            .as_slice()
            .iter()
            .find_map(|season| season.episode(id).map(|ep| (season, ep)))
    }
}

/// A season owned by one show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Season {
    /// Find an episode by id
    pub fn episode(&self, id: &EpisodeId) -> Option<&Episode> {
        self.episodes.iter().find(|e| &e.id == id)
    }
}

/// An episode owned by one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EpisodeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Audio locator
    pub file: String,
    pub season_id: SeasonId,
    pub show_id: ShowId,
}
