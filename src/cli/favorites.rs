//! Favorites CLI subcommands.
//!
//! - `list`: favorites grouped by show
//! - `add`: favorite an episode by show, season and episode id
//! - `remove`: drop a favorite
//! - `sort`: reorder favorites by title or added time

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::warn;

use super::{open_browser, truncate};
use crate::domain::{Episode, EpisodeId, SeasonId, ShowId, SortKey};
use crate::favorites::SortScope;

/// Favorites subcommands
#[derive(Subcommand, Debug)]
pub enum FavoritesCommands {
    /// List favorites grouped by show
    List,

    /// Add an episode to favorites
    Add {
        /// Show ID
        show_id: String,

        /// Season number
        season: String,

        /// Episode ID
        episode_id: String,
    },

    /// Remove an episode from favorites
    Remove {
        /// Episode ID
        episode_id: String,
    },

    /// Sort favorites
    Sort {
        /// Sort order: titleAsc, titleDesc, dateAsc, dateDesc
        key: String,

        /// Only sort the favorites of this show
        #[arg(long)]
        show: Option<String>,
    },
}

pub async fn execute(command: FavoritesCommands) -> Result<()> {
    match command {
        FavoritesCommands::List => list(),
        FavoritesCommands::Add {
            show_id,
            season,
            episode_id,
        } => add(&show_id, &season, &episode_id).await,
        FavoritesCommands::Remove { episode_id } => remove(&episode_id),
        FavoritesCommands::Sort { key, show } => sort(&key, show),
    }
}

fn list() -> Result<()> {
    let browser = open_browser()?;
    let favorites = browser.favorites();

    if favorites.is_empty() {
        println!("No favorites yet. Use 'podshelf favorites add <show> <season> <episode>'.");
        return Ok(());
    }

    for (show_id, entries) in favorites.list() {
        let title = entries
            .first()
            .map(|e| e.show_title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or("(unknown show)");
        println!("{} [{}]", title, show_id);

        for entry in entries {
            println!(
                "  {:<16} {:<40} {:<20} {}",
                entry.episode_id.as_str(),
                truncate(&entry.episode_title, 40),
                truncate(&entry.season_title, 20),
                entry.added_at.format("%Y-%m-%d %H:%M")
            );
        }
    }

    println!("\nTotal: {} favorites", favorites.len());
    Ok(())
}

/// Resolve the episode from the catalog; unknown episodes are stored as given
async fn add(show_id: &str, season: &str, episode_id: &str) -> Result<()> {
    let mut browser = open_browser()?;
    let show_id = ShowId::new(show_id);
    let season_id = SeasonId::new(season);
    let episode_id = EpisodeId::new(episode_id);

    let found = match browser.select_show(&show_id).await {
        Ok(show) => show
            .season(&season_id)
            .and_then(|s| s.episode(&episode_id))
            .cloned(),
        Err(e) => {
            warn!("Could not load show {}: {}", show_id, e);
            None
        }
    };

    let episode = found.unwrap_or_else(|| Episode {
        id: episode_id.clone(),
        title: String::new(),
        description: String::new(),
        file: String::new(),
        season_id,
        show_id,
    });

    if browser.add_favorite(&episode).context("Failed to save favorite")? {
        println!("Added {} to favorites", episode.id);
    } else {
        println!("{} is already a favorite", episode.id);
    }
    Ok(())
}

fn remove(episode_id: &str) -> Result<()> {
    let mut browser = open_browser()?;
    let episode_id = EpisodeId::new(episode_id);

    if browser.remove_favorite(&episode_id).context("Failed to save favorites")? {
        println!("Removed {} from favorites", episode_id);
    } else {
        println!("{} is not a favorite", episode_id);
    }
    Ok(())
}

fn sort(key: &str, show: Option<String>) -> Result<()> {
    let mut browser = open_browser()?;
    let key: SortKey = key.parse()?;
    let scope = match show {
        Some(id) => SortScope::Show(ShowId::new(id)),
        None => SortScope::All,
    };

    browser
        .sort_favorites(&scope, key)
        .context("Failed to save favorites")?;
    println!("Favorites sorted by {}", key);
    Ok(())
}
