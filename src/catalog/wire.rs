//! Wire shapes of the podcast catalog API and their normalization.
//!
//! The API is loose about types: ids arrive as strings or numbers, genres
//! as ids in previews and as titles in detail views, and seasons/episodes
//! carry positional numbers instead of ids. Everything is normalized into
//! the `domain` types here so nothing downstream sees the wire format.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::domain::{Episode, EpisodeId, GenreId, Season, SeasonId, Seasons, Show, ShowId};

/// Identifier that may be sent as a string or a number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// Genre as a numeric id or as a title
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireGenre {
    Id(u32),
    Title(String),
}

impl WireGenre {
    fn resolve(&self) -> Option<GenreId> {
        match self {
            WireGenre::Id(id) => Some(GenreId(*id)),
            WireGenre::Title(title) => title
                .parse::<u32>()
                .ok()
                .map(GenreId)
                .or_else(|| GenreId::from_title(title)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireSeasons {
    Count(u32),
    List(Vec<WireSeason>),
}

impl Default for WireSeasons {
    fn default() -> Self {
        WireSeasons::Count(0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireShow {
    pub id: WireId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub genres: Vec<WireGenre>,
    #[serde(default)]
    pub seasons: WireSeasons,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSeason {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub episodes: Vec<WireEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEpisode {
    #[serde(default)]
    pub id: Option<WireId>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file: String,
}

/// Body of the per-season episode endpoint: a bare list or a season object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireEpisodeList {
    List(Vec<WireEpisode>),
    Season(WireSeason),
}

impl WireShow {
    /// Normalize into a domain show
    pub fn into_show(self) -> Show {
        let id = ShowId::new(self.id.into_string());

        let genre_ids: BTreeSet<GenreId> = self.genres.iter().filter_map(WireGenre::resolve).collect();

        let seasons = match self.seasons {
            WireSeasons::Count(n) => Seasons::Count(n),
            WireSeasons::List(list) => Seasons::Expanded(
                list.into_iter()
                    .enumerate()
                    .map(|(idx, season)| season.into_season(&id, idx as u32 + 1))
                    .collect(),
            ),
        };

        Show {
            updated_at: self.updated.as_deref().and_then(parse_timestamp),
            id,
            title: self.title,
            description: self.description,
            image: self.image,
            genre_ids,
            seasons,
        }
    }
}

impl WireSeason {
    /// Normalize; `position` is the 1-based index used when no number is sent
    pub fn into_season(self, show_id: &ShowId, position: u32) -> Season {
        let number = self.season.unwrap_or(position);
        let id = self
            .id
            .map(|id| SeasonId::new(id.into_string()))
            .unwrap_or_else(|| SeasonId::from_number(number));

        let title = if self.title.is_empty() {
            format!("Season {}", number)
        } else {
            self.title
        };

        let episodes = normalize_episodes(self.episodes, show_id, &id);

        Season {
            id,
            title,
            image: self.image,
            episodes,
        }
    }
}

impl WireEpisodeList {
    /// Normalize the episode list of one season
    pub fn into_episodes(self, show_id: &ShowId, season_id: &SeasonId) -> Vec<Episode> {
        let episodes = match self {
            WireEpisodeList::List(list) => list,
            WireEpisodeList::Season(season) => season.episodes,
        };
        normalize_episodes(episodes, show_id, season_id)
    }
}

fn normalize_episodes(episodes: Vec<WireEpisode>, show_id: &ShowId, season_id: &SeasonId) -> Vec<Episode> {
    let season_number = season_id.number().unwrap_or(0);

    episodes
        .into_iter()
        .enumerate()
        .map(|(idx, ep)| {
            let number = ep.episode.unwrap_or(idx as u32 + 1);
            let id = match ep.id {
                Some(id) => EpisodeId::new(id.into_string()),
                None => EpisodeId::derive(show_id, season_number, number),
            };

            Episode {
                id,
                title: ep.title,
                description: ep.description,
                file: ep.file,
                season_id: season_id.clone(),
                show_id: show_id.clone(),
            }
        })
        .collect()
}

/// Parse an API timestamp: RFC 3339, a naive date-time, or a bare date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
