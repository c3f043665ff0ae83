//! reqwest-backed catalog source for the podcast API.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET /shows`
//! - `GET /id/{show_id}`
//! - `GET /shows/{show_id}/seasons/{season}/episodes/{file}`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::source::{CatalogSource, FetchError};
use super::wire::{WireEpisodeList, WireShow};
use crate::config::ApiSettings;
use crate::domain::{Episode, SeasonId, Show, ShowId};

/// Default catalog API
pub const DEFAULT_BASE_URL: &str = "https://podcast-api.netlify.app";

/// Default file name of the per-season episode list
pub const DEFAULT_EPISODE_LIST_FILE: &str = "episodes.json";

/// HTTP catalog client
pub struct HttpCatalogSource {
    /// API root without trailing slash
    base_url: String,
    /// Trailing path segment of the episode list endpoint
    episode_list_file: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpCatalogSource {
    /// Create a client for `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            episode_list_file: DEFAULT_EPISODE_LIST_FILE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create from resolved API settings (applies the request timeout)
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            episode_list_file: settings.episode_list_file.clone(),
            client,
        })
    }

    /// Override the episode list file name
    pub fn with_episode_list_file(mut self, file: impl Into<String>) -> Self {
        self.episode_list_file = file.into();
        self
    }

    fn shows_url(&self) -> String {
        format!("{}/shows", self.base_url)
    }

    fn show_url(&self, show_id: &ShowId) -> String {
        format!("{}/id/{}", self.base_url, show_id)
    }

    fn episodes_url(&self, show_id: &ShowId, season_id: &SeasonId) -> String {
        format!(
            "{}/shows/{}/seasons/{}/episodes/{}",
            self.base_url, show_id, season_id, self.episode_list_file
        )
    }

    /// GET `url` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(url, "Fetching");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_shows(&self) -> Result<Vec<Show>, FetchError> {
        let shows: Vec<WireShow> = self.get_json(&self.shows_url()).await?;
        Ok(shows.into_iter().map(WireShow::into_show).collect())
    }

    async fn fetch_show(&self, show_id: &ShowId) -> Result<Show, FetchError> {
        let show: WireShow = self.get_json(&self.show_url(show_id)).await?;
        Ok(show.into_show())
    }

    async fn fetch_episodes(
        &self,
        show_id: &ShowId,
        season_id: &SeasonId,
    ) -> Result<Vec<Episode>, FetchError> {
        let list: WireEpisodeList = self.get_json(&self.episodes_url(show_id, season_id)).await?;
        Ok(list.into_episodes(show_id, season_id))
    }
}
