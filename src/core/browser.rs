//! Command surface for the presentation layer.
//!
//! `Browser` ties the catalog cache, the view state, the current selection,
//! favorites and listening progress together. Every command is synchronous
//! except the ones that fetch from the catalog source.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::catalog::{Catalog, CatalogStatus, CatalogStore, FetchError};
use crate::domain::{
    Episode, EpisodeId, GenreFilter, GenreId, Season, SeasonId, Show, ShowId, SortKey, ViewState,
};
use crate::favorites::{FavoriteEntry, FavoritesLedger, SortScope};
use crate::progress::{
    CompletionPolicy, PlaybackSession, ProgressFilter, ProgressKey, ProgressRecord, ProgressTracker,
};
use crate::storage::{Storage, StorageError};
use crate::view::{list_genres, project};

/// Catalog browser state and commands
#[derive(Debug)]
pub struct Browser {
    store: Arc<CatalogStore>,
    view: ViewState,
    selected_show: Option<ShowId>,
    selected_season: Option<SeasonId>,
    selected_episode: Option<EpisodeId>,
    favorites: FavoritesLedger,
    progress: ProgressTracker,
}

impl Browser {
    /// Create a browser over `store`, restoring favorites and progress from `storage`
    pub fn new(store: Arc<CatalogStore>, storage: Storage, completion: CompletionPolicy) -> Self {
        Self {
            store,
            view: ViewState::default(),
            selected_show: None,
            selected_season: None,
            selected_episode: None,
            favorites: FavoritesLedger::load(storage.clone()),
            progress: ProgressTracker::load(storage, completion),
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn favorites(&self) -> &FavoritesLedger {
        &self.favorites
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn status(&self) -> CatalogStatus {
        self.store.status()
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.view.filter_text = text.into();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.view.sort_key = key;
    }

    /// `None` shows every genre
    pub fn set_genre_filter(&mut self, genre: impl Into<GenreFilter>) {
        self.view.genre_filter = genre.into();
    }

    /// Shows of the current snapshot, filtered and sorted by the view
    pub fn visible_shows(&self) -> Vec<Show> {
        let catalog = self.store.snapshot();
        project(&catalog, &self.view).into_iter().cloned().collect()
    }

    /// Genres present in the current snapshot
    pub fn genres(&self) -> BTreeSet<GenreId> {
        list_genres(&self.store.snapshot())
    }

    /// Reload the show list
    pub async fn refresh(&self) -> Result<Arc<Catalog>, FetchError> {
        self.store.load_catalog().await
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select a show, fetch its detail and select its first season.
    ///
    /// The selection changes before the fetch; on failure it stays on the
    /// show with no season.
    #[instrument(skip(self), fields(show = %show_id))]
    pub async fn select_show(&mut self, show_id: &ShowId) -> Result<Arc<Show>, FetchError> {
        self.selected_show = Some(show_id.clone());
        self.selected_season = None;
        self.selected_episode = None;

        let show = self.store.load_show_detail(show_id).await?;

        let first = show.seasons.as_slice().first().map(|s| s.id.clone());
        self.select_season(first);
        Ok(show)
    }

    /// Select a season of the current show.
    ///
    /// When progress exists for it, the most recently played episode becomes
    /// the current episode and is returned with its position.
    pub fn select_season(&mut self, season_id: Option<SeasonId>) -> Option<(EpisodeId, f64)> {
        self.selected_season = season_id;
        self.selected_episode = None;

        let (show_id, season_id) = match (&self.selected_show, &self.selected_season) {
            (Some(show), Some(season)) => (show, season),
            _ => return None,
        };

        let resumed = self.progress.resume(show_id, season_id);
        if let Some((episode_id, position)) = &resumed {
            debug!(episode = %episode_id, position, "Resuming episode");
            self.selected_episode = Some(episode_id.clone());
        }
        resumed
    }

    /// Make `episode` current and point last-listened at it.
    ///
    /// Returns the saved position to resume from (0 if none).
    pub fn select_episode(&mut self, episode: &Episode) -> Result<f64, StorageError> {
        self.selected_show = Some(episode.show_id.clone());
        self.selected_season = Some(episode.season_id.clone());
        self.selected_episode = Some(episode.id.clone());

        self.progress.select(&ProgressKey::from(episode))
    }

    /// Fetch the episodes of the selected season into the cached detail
    pub async fn load_selected_episodes(&self) -> Result<Vec<Episode>, FetchError> {
        match (&self.selected_show, &self.selected_season) {
            (Some(show), Some(season)) => self.store.load_episodes(show, season).await,
            _ => Ok(Vec::new()),
        }
    }

    pub fn selected_show(&self) -> Option<&ShowId> {
        self.selected_show.as_ref()
    }

    pub fn selected_season(&self) -> Option<&SeasonId> {
        self.selected_season.as_ref()
    }

    pub fn selected_episode(&self) -> Option<&EpisodeId> {
        self.selected_episode.as_ref()
    }

    /// Cached detail of the selected show
    pub fn current_show(&self) -> Option<Arc<Show>> {
        self.selected_show.as_ref().and_then(|id| self.store.detail(id))
    }

    pub fn current_season(&self) -> Option<Season> {
        let show = self.current_show()?;
        let season_id = self.selected_season.as_ref()?;
        show.season(season_id).cloned()
    }

    pub fn current_episode(&self) -> Option<Episode> {
        let season = self.current_season()?;
        let episode_id = self.selected_episode.as_ref()?;
        season.episode(episode_id).cloned()
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    /// Favorite an episode.
    ///
    /// Show and season titles come from the cached catalog when available;
    /// an episode unknown to the catalog is stored as given.
    pub fn add_favorite(&mut self, episode: &Episode) -> Result<bool, StorageError> {
        let entry = self.favorite_entry(episode);
        self.favorites.add_entry(entry)
    }

    pub fn remove_favorite(&mut self, episode_id: &EpisodeId) -> Result<bool, StorageError> {
        self.favorites.remove_episode(episode_id)
    }

    pub fn sort_favorites(&mut self, scope: &SortScope, key: SortKey) -> Result<(), StorageError> {
        self.favorites.sort(scope, key)
    }

    fn favorite_entry(&self, episode: &Episode) -> FavoriteEntry {
        if let Some(show) = self.store.detail(&episode.show_id) {
            if let Some(season) = show.season(&episode.season_id) {
                return FavoriteEntry::from_catalog(episode, &show, season);
            }
        }

        let mut entry = FavoriteEntry::new(episode);
        if let Some(show) = self.store.show(&episode.show_id) {
            entry.show_title = show.title;
        } else {
            debug!(episode = %episode.id, "Episode not in catalog, storing as given");
        }
        entry
    }

    // ------------------------------------------------------------------
    // Progress
    // ------------------------------------------------------------------

    pub fn record_progress(
        &mut self,
        key: &ProgressKey,
        position_seconds: f64,
        duration_seconds: f64,
    ) -> Result<ProgressRecord, StorageError> {
        self.progress.record_progress(key, position_seconds, duration_seconds)
    }

    pub fn record_completion(&mut self, key: &ProgressKey) -> Result<ProgressRecord, StorageError> {
        self.progress.record_completion(key)
    }

    /// Save the position of an attached device; no-op without one
    pub fn capture(&mut self, session: &PlaybackSession) -> Result<Option<ProgressRecord>, StorageError> {
        self.progress.capture(session)
    }

    /// Device reported the end of the episode
    pub fn finish(&mut self, session: &PlaybackSession) -> Result<ProgressRecord, StorageError> {
        self.progress.finish(session)
    }

    /// Clear progress matching `filter`; favorites are untouched
    pub fn reset_progress(&mut self, filter: &ProgressFilter) -> Result<usize, StorageError> {
        let removed = self.progress.reset(filter)?;
        if filter.is_all() {
            info!("Listening progress reset");
        }
        Ok(removed)
    }
}
