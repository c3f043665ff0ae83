//! Shared fixtures: in-process catalog sources and sample shows.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use podshelf::catalog::{parse_timestamp, CatalogSource, FetchError};
use podshelf::domain::{Episode, EpisodeId, GenreId, Season, SeasonId, Show, ShowId};

/// Preview show with an update date (`YYYY-MM-DD`)
pub fn show(id: &str, title: &str, updated: &str) -> Show {
    let mut show = Show::new(id, title);
    show.updated_at = parse_timestamp(updated);
    show
}

pub fn episode(show_id: &str, season: u32, number: u32) -> Episode {
    let show_id = ShowId::new(show_id);
    Episode {
        id: EpisodeId::derive(&show_id, season, number),
        title: format!("Episode {}", number),
        description: String::new(),
        file: format!("https://cdn.example.com/{}-{}-{}.mp3", show_id, season, number),
        season_id: SeasonId::from_number(season),
        show_id,
    }
}

/// Expanded show with `seasons` seasons of `episodes` episodes each
pub fn detailed_show(id: &str, title: &str, seasons: u32, episodes: u32) -> Show {
    let seasons = (1..=seasons)
        .map(|n| Season {
            id: SeasonId::from_number(n),
            title: format!("Season {}", n),
            image: None,
            episodes: (1..=episodes).map(|e| episode(id, n, e)).collect(),
        })
        .collect();

    Show::new(id, title).with_genre(GenreId(1)).with_seasons(seasons)
}

/// Source answering from fixed data, switchable offline
#[derive(Default)]
pub struct StaticSource {
    pub shows: Mutex<Vec<Show>>,
    pub details: Mutex<HashMap<ShowId, Show>>,
    pub episodes: Mutex<HashMap<(ShowId, SeasonId), Vec<Episode>>>,
    pub offline: AtomicBool,
    pub calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(shows: Vec<Show>) -> Self {
        Self {
            shows: Mutex::new(shows),
            ..Self::default()
        }
    }

    pub fn with_detail(self, show: Show) -> Self {
        self.details.lock().unwrap().insert(show.id.clone(), show);
        self
    }

    /// Serve `episodes` for one season instead of the detail's list
    pub fn with_episodes(self, show_id: &str, season: u32, episodes: Vec<Episode>) -> Self {
        self.episodes
            .lock()
            .unwrap()
            .insert((ShowId::new(show_id), SeasonId::from_number(season)), episodes);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            Err(FetchError::Unavailable("network down".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_shows(&self) -> Result<Vec<Show>, FetchError> {
        self.check()?;
        Ok(self.shows.lock().unwrap().clone())
    }

    async fn fetch_show(&self, show_id: &ShowId) -> Result<Show, FetchError> {
        self.check()?;
        self.details
            .lock()
            .unwrap()
            .get(show_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(show_id.to_string()))
    }

    async fn fetch_episodes(
        &self,
        show_id: &ShowId,
        season_id: &SeasonId,
    ) -> Result<Vec<Episode>, FetchError> {
        self.check()?;
        let key = (show_id.clone(), season_id.clone());
        if let Some(episodes) = self.episodes.lock().unwrap().get(&key) {
            return Ok(episodes.clone());
        }

        let details = self.details.lock().unwrap();
        let show = details
            .get(show_id)
            .ok_or_else(|| FetchError::NotFound(show_id.to_string()))?;
        Ok(show
            .season(season_id)
            .map(|s| s.episodes.clone())
            .unwrap_or_default())
    }
}

type ShowsReply = Result<Vec<Show>, FetchError>;

/// Source whose show-list responses are released by the test, in any order
#[derive(Default)]
pub struct ScriptedSource {
    pending: Mutex<VecDeque<oneshot::Receiver<ShowsReply>>>,
}

impl ScriptedSource {
    /// Queue a reply slot for the next `fetch_shows` call
    pub fn expect_fetch(&self) -> oneshot::Sender<ShowsReply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl CatalogSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_shows(&self) -> Result<Vec<Show>, FetchError> {
        let reply = self.pending.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FetchError::Unavailable("reply dropped".to_string()))),
            None => Err(FetchError::Unavailable("unexpected fetch".to_string())),
        }
    }

    async fn fetch_show(&self, show_id: &ShowId) -> Result<Show, FetchError> {
        Err(FetchError::NotFound(show_id.to_string()))
    }

    async fn fetch_episodes(
        &self,
        show_id: &ShowId,
        _season_id: &SeasonId,
    ) -> Result<Vec<Episode>, FetchError> {
        Err(FetchError::NotFound(show_id.to_string()))
    }
}
