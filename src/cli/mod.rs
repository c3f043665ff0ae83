//! Command-line interface for podshelf.
//!
//! Provides commands for browsing the catalog, inspecting shows and
//! seasons, and managing favorites and listening progress.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::{CatalogStore, HttpCatalogSource};
use crate::config::{self, paths};
use crate::core::Browser;
use crate::domain::{GenreFilter, SeasonId, ShowId, SortKey};
use crate::progress::{format_time, PlaybackState, ProgressKey};
use crate::storage::Storage;

pub mod favorites;
pub mod progress;

/// podshelf - podcast catalog browser
#[derive(Parser, Debug)]
#[command(name = "podshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List shows in the catalog
    Shows {
        /// Only titles containing this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort order: titleAsc, titleDesc, dateAsc, dateDesc
        #[arg(short, long, default_value = "none")]
        sort: String,

        /// Genre id or title
        #[arg(short, long, default_value = "all")]
        genre: String,

        /// Maximum number of shows to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// List the genres present in the catalog
    Genres,

    /// Show details of one show
    Show {
        /// Show ID
        show_id: String,
    },

    /// List the episodes of a season
    Episodes {
        /// Show ID
        show_id: String,

        /// Season number
        season: String,
    },

    /// Favorite episodes
    Favorites {
        #[command(subcommand)]
        command: favorites::FavoritesCommands,
    },

    /// Listening progress
    Progress {
        #[command(subcommand)]
        command: progress::ProgressCommands,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Shows {
                filter,
                sort,
                genre,
                limit,
            } => list_shows(filter, &sort, &genre, limit).await,
            Commands::Genres => list_genres().await,
            Commands::Show { show_id } => show_show(&show_id).await,
            Commands::Episodes { show_id, season } => list_episodes(&show_id, &season).await,
            Commands::Favorites { command } => favorites::execute(command).await,
            Commands::Progress { command } => progress::execute(command),
            Commands::Config => show_config(),
        }
    }
}

/// Build a browser over the configured API and storage file
pub(crate) fn open_browser() -> Result<Browser> {
    let cfg = config::config()?;

    let source = HttpCatalogSource::from_settings(&cfg.api)
        .context("Failed to create catalog HTTP client")?;
    let store = Arc::new(CatalogStore::with_policy(Arc::new(source), cfg.stale_policy));
    let storage = Storage::file(paths::storage_file()?);

    Ok(Browser::new(store, storage, cfg.completion_policy))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

/// List shows through the view projection
async fn list_shows(filter: Option<String>, sort: &str, genre: &str, limit: usize) -> Result<()> {
    let mut browser = open_browser()?;
    browser.set_sort(sort.parse::<SortKey>()?);
    browser.set_genre_filter(genre.parse::<GenreFilter>()?);
    if let Some(text) = filter {
        browser.set_filter_text(text);
    }

    let catalog = browser.refresh().await.context("Failed to load catalog")?;
    let shows = browser.visible_shows();

    if shows.is_empty() {
        println!("No shows match");
        return Ok(());
    }

    println!("{:<8} {:<45} {:<8} {:<12}", "ID", "TITLE", "SEASONS", "UPDATED");
    println!("{}", "-".repeat(75));

    for show in shows.iter().take(limit) {
        let updated = show
            .updated_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<8} {:<45} {:<8} {:<12}",
            show.id.as_str(),
            truncate(&show.title, 45),
            show.seasons.count(),
            updated
        );
    }

    println!("\nShowing {} of {} shows", shows.len().min(limit), catalog.len());

    Ok(())
}

async fn list_genres() -> Result<()> {
    let browser = open_browser()?;
    browser.refresh().await.context("Failed to load catalog")?;

    for genre in browser.genres() {
        println!("{:>3}  {}", genre.0, genre);
    }

    Ok(())
}

/// Show details with per-season resume state
async fn show_show(show_id: &str) -> Result<()> {
    let mut browser = open_browser()?;
    let show_id = ShowId::new(show_id);

    let show = browser
        .select_show(&show_id)
        .await
        .with_context(|| format!("Failed to load show {}", show_id))?;

    println!("{}", show.title);
    println!("{}", "=".repeat(show.title.chars().count()));
    if !show.description.is_empty() {
        println!("{}", show.description);
    }
    println!();

    let genres: Vec<String> = show.genre_ids.iter().map(|g| g.to_string()).collect();
    if !genres.is_empty() {
        println!("Genres: {}", genres.join(", "));
    }
    if let Some(updated) = show.updated_at {
        println!("Updated: {}", updated.format("%Y-%m-%d"));
    }
    println!();

    for season in show.seasons.as_slice() {
        print!("  {:<4} {:<40} {:>3} episodes", season.id.as_str(), truncate(&season.title, 40), season.episodes.len());
        if let Some((episode_id, position)) = browser.progress().resume(&show.id, &season.id) {
            print!("  (resume {} at {})", episode_id, format_time(position));
        }
        println!();
    }

    Ok(())
}

/// List the episodes of a season with their playback state
async fn list_episodes(show_id: &str, season: &str) -> Result<()> {
    let browser = open_browser()?;
    let show_id = ShowId::new(show_id);
    let season_id = SeasonId::new(season);

    let episodes = browser
        .store()
        .load_episodes(&show_id, &season_id)
        .await
        .with_context(|| format!("Failed to load episodes for {} season {}", show_id, season_id))?;

    if episodes.is_empty() {
        println!("No episodes");
        return Ok(());
    }

    println!("{:<16} {:<45} {:<12}", "ID", "TITLE", "PROGRESS");
    println!("{}", "-".repeat(75));

    for episode in &episodes {
        let key = ProgressKey::from(episode);
        let progress = match browser.progress().state(&key) {
            PlaybackState::NotStarted => "-".to_string(),
            PlaybackState::Completed => "done".to_string(),
            PlaybackState::InProgress => browser
                .progress()
                .record(&key)
                .map(|r| format_time(r.position_seconds))
                .unwrap_or_default(),
        };
        let star = if browser.favorites().contains(&episode.id) { "*" } else { " " };
        println!(
            "{:<16} {}{:<44} {:<12}",
            episode.id.as_str(),
            star,
            truncate(&episode.title, 44),
            progress
        );
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("podshelf configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home:    {}", cfg.home.display());
    println!("  Storage: {}", paths::storage_file()?.display());
    println!();
    println!("API:");
    println!("  Base URL:          {}", cfg.api.base_url);
    println!("  Timeout:           {}s", cfg.api.timeout_seconds);
    println!("  Episode list file: {}", cfg.api.episode_list_file);
    println!();
    println!("Policies:");
    println!("  Stale responses: {:?}", cfg.stale_policy);
    println!("  Completion:      {}", cfg.completion_policy);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shows_command() {
        let cli = Cli::try_parse_from(["podshelf", "shows", "--sort", "titleAsc", "-g", "Comedy"]).unwrap();
        match cli.command {
            Commands::Shows { sort, genre, limit, filter } => {
                assert_eq!(sort, "titleAsc");
                assert_eq!(genre, "Comedy");
                assert_eq!(limit, 20);
                assert!(filter.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long title", 10), "a very ...");
    }
}
