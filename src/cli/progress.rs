//! Listening progress CLI subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;

use super::open_browser;
use crate::domain::{SeasonId, ShowId};
use crate::progress::{format_time, ProgressFilter, ProgressKey};

/// Progress subcommands
#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// Save a playback position
    Record {
        show_id: String,
        season: String,
        episode_id: String,

        /// Position in seconds
        position: f64,

        /// Duration in seconds (0 if unknown)
        #[arg(default_value = "0")]
        duration: f64,
    },

    /// Mark an episode as finished
    Complete {
        show_id: String,
        season: String,
        episode_id: String,
    },

    /// Show where to resume a season
    Resume { show_id: String, season: String },

    /// Clear progress (everything when no option is given)
    Reset {
        #[arg(long)]
        show: Option<String>,

        #[arg(long)]
        season: Option<String>,

        #[arg(long)]
        episode: Option<String>,
    },

    /// Show the last listened episode
    Last,
}

pub fn execute(command: ProgressCommands) -> Result<()> {
    let mut browser = open_browser()?;

    match command {
        ProgressCommands::Record {
            show_id,
            season,
            episode_id,
            position,
            duration,
        } => {
            let key = ProgressKey::new(show_id, season, episode_id);
            let record = browser
                .record_progress(&key, position, duration)
                .context("Failed to save progress")?;
            println!(
                "{} at {} / {}",
                key.episode_id,
                format_time(record.position_seconds),
                format_time(record.duration_seconds)
            );
        }
        ProgressCommands::Complete {
            show_id,
            season,
            episode_id,
        } => {
            let key = ProgressKey::new(show_id, season, episode_id);
            browser
                .record_completion(&key)
                .context("Failed to save progress")?;
            println!("{} completed", key.episode_id);
        }
        ProgressCommands::Resume { show_id, season } => {
            let resumed = browser
                .progress()
                .resume(&ShowId::new(show_id), &SeasonId::new(season));
            match resumed {
                Some((episode_id, position)) => {
                    println!("Resume {} at {}", episode_id, format_time(position))
                }
                None => println!("No progress for this season"),
            }
        }
        ProgressCommands::Reset {
            show,
            season,
            episode,
        } => {
            let filter = ProgressFilter {
                show_id: show.map(Into::into),
                season_id: season.map(Into::into),
                episode_id: episode.map(Into::into),
            };
            let removed = browser
                .reset_progress(&filter)
                .context("Failed to reset progress")?;
            println!("Cleared {} progress records", removed);
        }
        ProgressCommands::Last => match browser.progress().last_listened() {
            Some(last) => println!(
                "{} (show {}, season {}) at {}",
                last.key.episode_id,
                last.key.show_id,
                last.key.season_id,
                format_time(last.position_seconds)
            ),
            None => println!("Nothing listened yet"),
        },
    }

    Ok(())
}
