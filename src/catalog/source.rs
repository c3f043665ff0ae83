//! Source interface for catalog data.
//!
//! The store only depends on this trait, so the HTTP client can be swapped
//! for a fixture or an offline mirror.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Episode, SeasonId, Show, ShowId};

/// Errors raised while fetching catalog data
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only provider of shows, show details and season episode lists
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch the full list of show previews
    async fn fetch_shows(&self) -> Result<Vec<Show>, FetchError>;

    /// Fetch one show with its seasons and episodes expanded
    async fn fetch_show(&self, show_id: &ShowId) -> Result<Show, FetchError>;

    /// Fetch the episode list of one season
    async fn fetch_episodes(
        &self,
        show_id: &ShowId,
        season_id: &SeasonId,
    ) -> Result<Vec<Episode>, FetchError>;
}
