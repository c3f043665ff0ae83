//! Favorite episodes grouped by show, persisted write-through.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Episode, EpisodeId, Season, Show, ShowId, SortKey};
use crate::storage::{Storage, StorageError, FAVORITES_KEY};
use crate::view::sort_stable;

/// A favorited episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub episode_id: EpisodeId,
    pub show_id: ShowId,
    pub show_title: String,
    pub season_title: String,
    pub episode_title: String,
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Entry for an episode as given, without catalog context
    pub fn new(episode: &Episode) -> Self {
        Self {
            episode_id: episode.id.clone(),
            show_id: episode.show_id.clone(),
            show_title: String::new(),
            season_title: String::new(),
            episode_title: episode.title.clone(),
            added_at: Utc::now(),
        }
    }

    /// Entry with show and season titles resolved
    pub fn from_catalog(episode: &Episode, show: &Show, season: &Season) -> Self {
        Self {
            show_id: show.id.clone(),
            show_title: show.title.clone(),
            season_title: season.title.clone(),
            ..Self::new(episode)
        }
    }
}

/// Which groups a sort applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortScope {
    All,
    Show(ShowId),
}

/// Favorites grouped by show id
pub type FavoriteGroups = BTreeMap<ShowId, Vec<FavoriteEntry>>;

/// Ledger of favorite episodes
#[derive(Debug)]
pub struct FavoritesLedger {
    storage: Storage,
    groups: FavoriteGroups,
}

impl FavoritesLedger {
    /// Reconstruct the ledger from storage (absent or malformed → empty)
    pub fn load(storage: Storage) -> Self {
        let mut groups: FavoriteGroups = storage.get(FAVORITES_KEY).unwrap_or_default();
        groups.retain(|_, entries| !entries.is_empty());

        Self { storage, groups }
    }

    /// Favorite `episode`, resolving titles from its show and season.
    ///
    /// Returns `false` when the episode is already a favorite of that show.
    pub fn add(&mut self, episode: &Episode, show: &Show, season: &Season) -> Result<bool, StorageError> {
        self.add_entry(FavoriteEntry::from_catalog(episode, show, season))
    }

    /// Insert a prepared entry; no-op when its episode is already in the group
    pub fn add_entry(&mut self, entry: FavoriteEntry) -> Result<bool, StorageError> {
        let group = self.groups.entry(entry.show_id.clone()).or_default();

        if group.iter().any(|e| e.episode_id == entry.episode_id) {
            debug!(episode = %entry.episode_id, "Already a favorite");
            return Ok(false);
        }

        group.push(entry);
        self.persist()?;
        Ok(true)
    }

    /// Remove one favorite; an emptied group is dropped
    pub fn remove(&mut self, episode_id: &EpisodeId, show_id: &ShowId) -> Result<bool, StorageError> {
        let Some(group) = self.groups.get_mut(show_id) else {
            return Ok(false);
        };

        let before = group.len();
        group.retain(|e| &e.episode_id != episode_id);
        if group.len() == before {
            return Ok(false);
        }

        if group.is_empty() {
            self.groups.remove(show_id);
        }

        self.persist()?;
        Ok(true)
    }

    /// Remove an episode from whichever group holds it
    pub fn remove_episode(&mut self, episode_id: &EpisodeId) -> Result<bool, StorageError> {
        match self.find_show(episode_id) {
            Some(show_id) => self.remove(episode_id, &show_id),
            None => Ok(false),
        }
    }

    /// Reorder entries by episode title or by added time
    pub fn sort(&mut self, scope: &SortScope, key: SortKey) -> Result<(), StorageError> {
        if key == SortKey::None {
            return Ok(());
        }

        let sort_group = |entries: &mut Vec<FavoriteEntry>| {
            sort_stable(
                entries,
                key,
                |e| e.episode_title.as_str(),
                |e| Some(e.added_at),
            )
        };

        match scope {
            SortScope::All => self.groups.values_mut().for_each(sort_group),
            SortScope::Show(show_id) => {
                if let Some(entries) = self.groups.get_mut(show_id) {
                    sort_group(entries);
                }
            }
        }

        self.persist()
    }

    /// All favorites by show
    pub fn list(&self) -> &FavoriteGroups {
        &self.groups
    }

    /// Favorites of one show
    pub fn group(&self, show_id: &ShowId) -> &[FavoriteEntry] {
        self.groups.get(show_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Show id of the group holding `episode_id`
    pub fn find_show(&self, episode_id: &EpisodeId) -> Option<ShowId> {
        self.groups
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| &e.episode_id == episode_id))
            .map(|(show_id, _)| show_id.clone())
    }

    /// Whether `episode_id` is a favorite in any group
    pub fn contains(&self, episode_id: &EpisodeId) -> bool {
        self.find_show(episode_id).is_some()
    }

    /// Total number of favorites
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.set(FAVORITES_KEY, &self.groups)
    }
}
