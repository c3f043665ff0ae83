//! Cached catalog with loading and error status.
//!
//! The show list is held as an `Arc<Catalog>` that is swapped whole on
//! every successful load, so readers see either the old or the new list.
//! Expanded shows live in a separate per-show detail map.
//!
//! Overlapping loads of the same resource are not deduplicated. Each load
//! takes a generation number for its resource key; under
//! [`StalePolicy::LastResponseWins`] every response is applied in arrival
//! order, under [`StalePolicy::DropSuperseded`] a response is discarded
//! when a newer request for the same key was issued after it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::source::{CatalogSource, FetchError};
use crate::domain::{Episode, Seasons, SeasonId, Show, ShowId};

/// Snapshot of the show list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    /// Shows in source order
    pub shows: Vec<Show>,

    /// When this snapshot was fetched
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// Build a snapshot from shows
    pub fn new(shows: Vec<Show>) -> Self {
        Self {
            shows,
            fetched_at: None,
        }
    }

    /// Get a show by id
    pub fn get(&self, id: &ShowId) -> Option<&Show> {
        self.shows.iter().find(|s| &s.id == id)
    }

    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }
}

/// Loading/error status for the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogStatus {
    /// At least one load is in flight
    pub loading: bool,

    /// Message of the last failed load, cleared by the next successful one
    pub error: Option<String>,
}

/// What to do with a response that arrives after a newer request was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Apply every response as it arrives
    #[default]
    LastResponseWins,

    /// Discard responses superseded by a later request for the same key
    DropSuperseded,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ResourceKey {
    Shows,
    Show(ShowId),
    Episodes(ShowId, SeasonId),
}

#[derive(Debug, Default)]
struct CatalogState {
    catalog: Arc<Catalog>,
    details: HashMap<ShowId, Arc<Show>>,
    in_flight: usize,
    error: Option<String>,
}

/// Catalog cache over a [`CatalogSource`]
pub struct CatalogStore {
    source: Arc<dyn CatalogSource>,
    policy: StalePolicy,
    state: RwLock<CatalogState>,
    generations: Mutex<HashMap<ResourceKey, u64>>,
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("source", &self.source.name())
            .field("policy", &self.policy)
            .field("status", &self.status())
            .finish()
    }
}

/// Keeps the loading flag raised while a load is in flight
struct LoadingGuard<'a> {
    state: &'a RwLock<CatalogState>,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a RwLock<CatalogState>) -> Self {
        if let Ok(mut s) = state.write() {
            s.in_flight += 1;
        }
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut s) = self.state.write() {
            s.in_flight = s.in_flight.saturating_sub(1);
        }
    }
}

impl CatalogStore {
    /// Create an empty store
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self::with_policy(source, StalePolicy::default())
    }

    /// Create an empty store with an explicit stale-response policy
    pub fn with_policy(source: Arc<dyn CatalogSource>, policy: StalePolicy) -> Self {
        Self {
            source,
            policy,
            state: RwLock::new(CatalogState::default()),
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// Stale-response policy in effect
    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Current show list snapshot
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.state
            .read()
            .map(|s| Arc::clone(&s.catalog))
            .unwrap_or_default()
    }

    /// Cached preview of a show
    pub fn show(&self, id: &ShowId) -> Option<Show> {
        self.snapshot().get(id).cloned()
    }

    /// Cached expanded show
    pub fn detail(&self, id: &ShowId) -> Option<Arc<Show>> {
        self.state.read().ok()?.details.get(id).cloned()
    }

    /// Loading/error status
    pub fn status(&self) -> CatalogStatus {
        self.state
            .read()
            .map(|s| CatalogStatus {
                loading: s.in_flight > 0,
                error: s.error.clone(),
            })
            .unwrap_or_default()
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        if let Ok(mut s) = self.state.write() {
            s.error = None;
        }
    }

    /// Fetch the full show list and replace the cached snapshot.
    ///
    /// On failure the previous snapshot is kept and the error status is set.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load_catalog(&self) -> Result<Arc<Catalog>, FetchError> {
        let _loading = LoadingGuard::new(&self.state);
        let key = ResourceKey::Shows;
        let generation = self.begin(&key);

        let result = self.source.fetch_shows().await;

        match result {
            Ok(shows) => {
                let catalog = Arc::new(Catalog {
                    shows,
                    fetched_at: Some(Utc::now()),
                });

                if self.accepts(&key, generation) {
                    info!(shows = catalog.len(), "Catalog loaded");
                    self.apply(|s| {
                        s.catalog = Arc::clone(&catalog);
                        s.error = None;
                    });
                }
                Ok(catalog)
            }
            Err(e) => {
                if self.accepts(&key, generation) {
                    self.fail(format!("Error fetching shows: {}", e));
                }
                Err(e)
            }
        }
    }

    /// Fetch one show with seasons and episodes and cache it in the detail map.
    ///
    /// The list-level preview is left untouched.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load_show_detail(&self, show_id: &ShowId) -> Result<Arc<Show>, FetchError> {
        let _loading = LoadingGuard::new(&self.state);
        let key = ResourceKey::Show(show_id.clone());
        let generation = self.begin(&key);

        match self.source.fetch_show(show_id).await {
            Ok(show) => {
                let show = Arc::new(show);
                if self.accepts(&key, generation) {
                    info!(show = %show_id, seasons = show.seasons.count(), "Show detail loaded");
                    self.apply(|s| {
                        s.details.insert(show_id.clone(), Arc::clone(&show));
                        s.error = None;
                    });
                }
                Ok(show)
            }
            Err(e) => {
                if self.accepts(&key, generation) {
                    self.fail(format!("Error fetching show {}: {}", show_id, e));
                }
                Err(e)
            }
        }
    }

    /// Fetch the episodes of one season.
    ///
    /// When the show detail is cached, the season's episodes are replaced
    /// with the fetched list.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn load_episodes(
        &self,
        show_id: &ShowId,
        season_id: &SeasonId,
    ) -> Result<Vec<Episode>, FetchError> {
        let _loading = LoadingGuard::new(&self.state);
        let key = ResourceKey::Episodes(show_id.clone(), season_id.clone());
        let generation = self.begin(&key);

        match self.source.fetch_episodes(show_id, season_id).await {
            Ok(episodes) => {
                if self.accepts(&key, generation) {
                    debug!(show = %show_id, season = %season_id, episodes = episodes.len(), "Season hydrated");
                    self.apply(|s| {
                        if let Some(detail) = s.details.get(show_id) {
                            let hydrated = hydrate_season(detail, season_id, &episodes);
                            s.details.insert(show_id.clone(), Arc::new(hydrated));
                        }
                        s.error = None;
                    });
                }
                Ok(episodes)
            }
            Err(e) => {
                if self.accepts(&key, generation) {
                    self.fail(format!(
                        "Error fetching episodes for show {} season {}: {}",
                        show_id, season_id, e
                    ));
                }
                Err(e)
            }
        }
    }

    /// Register a new request for `key` and return its generation
    fn begin(&self, key: &ResourceKey) -> u64 {
        let mut generations = match self.generations.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let generation = generations.entry(key.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Whether a response of `generation` may be applied
    fn accepts(&self, key: &ResourceKey, generation: u64) -> bool {
        if self.policy == StalePolicy::LastResponseWins {
            return true;
        }

        let latest = match self.generations.lock() {
            Ok(g) => g.get(key).copied(),
            Err(poisoned) => poisoned.into_inner().get(key).copied(),
        };

        let current = latest == Some(generation);
        if !current {
            debug!(?key, generation, ?latest, "Dropping superseded response");
        }
        current
    }

    fn apply<F: FnOnce(&mut CatalogState)>(&self, update: F) {
        match self.state.write() {
            Ok(mut s) => update(&mut s),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
    }

    fn fail(&self, message: String) {
        warn!("{}", message);
        self.apply(|s| s.error = Some(message));
    }
}

/// Copy of `show` with the episodes of `season_id` replaced
fn hydrate_season(show: &Show, season_id: &SeasonId, episodes: &[Episode]) -> Show {
    let mut show = show.clone();
    if let Seasons::Expanded(seasons) = &mut show.seasons {
        if let Some(season) = seasons.iter_mut().find(|s| &s.id == season_id) {
            season.episodes = episodes.to_vec();
        }
    }
    show
}
