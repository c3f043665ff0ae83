//! Per-episode listening progress, completion history and the
//! last-listened pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::session::PlaybackSession;
use crate::domain::{Episode, EpisodeId, SeasonId, ShowId};
use crate::storage::{Storage, StorageError, LAST_LISTENED_KEY, LISTENING_HISTORY_KEY};

/// Identifies one episode within its show and season
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressKey {
    pub show_id: ShowId,
    pub season_id: SeasonId,
    pub episode_id: EpisodeId,
}

impl ProgressKey {
    pub fn new(
        show_id: impl Into<ShowId>,
        season_id: impl Into<SeasonId>,
        episode_id: impl Into<EpisodeId>,
    ) -> Self {
        Self {
            show_id: show_id.into(),
            season_id: season_id.into(),
            episode_id: episode_id.into(),
        }
    }
}

impl From<&Episode> for ProgressKey {
    fn from(episode: &Episode) -> Self {
        Self {
            show_id: episode.show_id.clone(),
            season_id: episode.season_id.clone(),
            episode_id: episode.id.clone(),
        }
    }
}

/// Saved playback position of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub key: ProgressKey,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
    /// Monotonic write counter; higher is more recent
    #[serde(default)]
    pub revision: u64,
}

/// One finished listen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub key: ProgressKey,
    pub completed_at: DateTime<Utc>,
}

/// Persisted under `listeningHistory`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningHistory {
    #[serde(default)]
    pub records: Vec<ProgressRecord>,
    #[serde(default)]
    pub completions: Vec<CompletionEntry>,
}

impl ListeningHistory {
    fn find(&self, key: &ProgressKey) -> Option<&ProgressRecord> {
        self.records.iter().find(|r| &r.key == key)
    }
}

/// Persisted under `lastListened`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastListened {
    pub key: ProgressKey,
    pub position_seconds: f64,
    pub updated_at: DateTime<Utc>,
}

/// What happens to the saved position when an episode completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Position returns to 0
    #[default]
    ResetPosition,
    /// Position is kept alongside the completed flag
    KeepPosition,
}

impl std::fmt::Display for CompletionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionPolicy::ResetPosition => write!(f, "reset_position"),
            CompletionPolicy::KeepPosition => write!(f, "keep_position"),
        }
    }
}

impl std::str::FromStr for CompletionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "reset_position" | "reset" => Ok(CompletionPolicy::ResetPosition),
            "keep_position" | "keep" => Ok(CompletionPolicy::KeepPosition),
            _ => anyhow::bail!("Unknown completion policy: {}", s),
        }
    }
}

/// Lifecycle of one episode. Completion is not terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    NotStarted,
    InProgress,
    Completed,
}

/// Selects records to clear; all fields empty matches everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressFilter {
    pub show_id: Option<ShowId>,
    pub season_id: Option<SeasonId>,
    pub episode_id: Option<EpisodeId>,
}

impl ProgressFilter {
    /// Match everything
    pub fn all() -> Self {
        Self::default()
    }

    pub fn show(show_id: impl Into<ShowId>) -> Self {
        Self {
            show_id: Some(show_id.into()),
            ..Self::default()
        }
    }

    pub fn with_season(mut self, season_id: impl Into<SeasonId>) -> Self {
        self.season_id = Some(season_id.into());
        self
    }

    pub fn with_episode(mut self, episode_id: impl Into<EpisodeId>) -> Self {
        self.episode_id = Some(episode_id.into());
        self
    }

    pub fn is_all(&self) -> bool {
        self.show_id.is_none() && self.season_id.is_none() && self.episode_id.is_none()
    }

    pub fn matches(&self, key: &ProgressKey) -> bool {
        self.show_id.as_ref().map_or(true, |id| id == &key.show_id)
            && self.season_id.as_ref().map_or(true, |id| id == &key.season_id)
            && self.episode_id.as_ref().map_or(true, |id| id == &key.episode_id)
    }
}

/// Tracks listening progress, written through to storage
#[derive(Debug)]
pub struct ProgressTracker {
    storage: Storage,
    policy: CompletionPolicy,
    history: ListeningHistory,
    last_listened: Option<LastListened>,
    revision: u64,
}

impl ProgressTracker {
    /// Reconstruct from storage (absent or malformed → empty)
    pub fn load(storage: Storage, policy: CompletionPolicy) -> Self {
        let history: ListeningHistory = storage.get(LISTENING_HISTORY_KEY).unwrap_or_default();
        let last_listened: Option<LastListened> = storage.get(LAST_LISTENED_KEY);
        let revision = history.records.iter().map(|r| r.revision).max().unwrap_or(0);

        Self {
            storage,
            policy,
            history,
            last_listened,
            revision,
        }
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    /// Save the position of an episode.
    ///
    /// NaN or negative values become 0; the position is capped at the
    /// duration when the duration is known. A completed episode re-enters
    /// in-progress.
    pub fn record_progress(
        &mut self,
        key: &ProgressKey,
        position_seconds: f64,
        duration_seconds: f64,
    ) -> Result<ProgressRecord, StorageError> {
        let position = sanitize(position_seconds);
        let duration = sanitize(duration_seconds);

        // an unknown duration (0) keeps the one already stored
        let record = self.upsert(key, |record| {
            if duration > 0.0 {
                record.duration_seconds = duration;
            }
            record.position_seconds = if record.duration_seconds > 0.0 {
                position.min(record.duration_seconds)
            } else {
                position
            };
            record.completed = false;
        });

        self.point_at(key, record.position_seconds);
        self.persist_all()?;
        Ok(record)
    }

    /// Mark an episode finished and append to the completion history
    pub fn record_completion(&mut self, key: &ProgressKey) -> Result<ProgressRecord, StorageError> {
        let policy = self.policy;
        let record = self.upsert(key, |record| {
            record.completed = true;
            if policy == CompletionPolicy::ResetPosition {
                record.position_seconds = 0.0;
            }
        });

        self.history.completions.push(CompletionEntry {
            key: key.clone(),
            completed_at: record.updated_at,
        });
        self.point_at(key, record.position_seconds);

        info!(episode = %key.episode_id, "Episode completed");
        self.persist_all()?;
        Ok(record)
    }

    /// Most recently updated episode of a show/season with its position
    pub fn resume(&self, show_id: &ShowId, season_id: &SeasonId) -> Option<(EpisodeId, f64)> {
        self.history
            .records
            .iter()
            .filter(|r| &r.key.show_id == show_id && &r.key.season_id == season_id)
            .max_by_key(|r| r.revision)
            .map(|r| (r.key.episode_id.clone(), r.position_seconds))
    }

    /// Clear matching records and return how many were removed.
    ///
    /// An empty filter also clears the completion history and the
    /// last-listened pointer and removes both storage keys.
    pub fn reset(&mut self, filter: &ProgressFilter) -> Result<usize, StorageError> {
        let before = self.history.records.len();

        if filter.is_all() {
            self.history = ListeningHistory::default();
            self.last_listened = None;
            self.storage.remove(LISTENING_HISTORY_KEY)?;
            self.storage.remove(LAST_LISTENED_KEY)?;
            info!(removed = before, "Cleared all listening progress");
            return Ok(before);
        }

        self.history.records.retain(|r| !filter.matches(&r.key));
        self.history.completions.retain(|c| !filter.matches(&c.key));
        if self
            .last_listened
            .as_ref()
            .is_some_and(|last| filter.matches(&last.key))
        {
            self.last_listened = None;
        }

        let removed = before - self.history.records.len();
        info!(removed, "Cleared listening progress");
        self.persist_all()?;
        Ok(removed)
    }

    /// Make `key` the current episode; returns its saved position (0 if none)
    pub fn select(&mut self, key: &ProgressKey) -> Result<f64, StorageError> {
        let position = self.record(key).map(|r| r.position_seconds).unwrap_or(0.0);
        self.point_at(key, position);
        self.persist_last()?;
        Ok(position)
    }

    /// Save the position reported by the session's device.
    ///
    /// Returns `None` without touching storage when no device is attached.
    pub fn capture(&mut self, session: &PlaybackSession) -> Result<Option<ProgressRecord>, StorageError> {
        let Some(position) = session.position() else {
            debug!(episode = %session.key().episode_id, "No playback device, nothing to capture");
            return Ok(None);
        };
        let duration = session.duration().unwrap_or(0.0);
        self.record_progress(session.key(), position, duration).map(Some)
    }

    /// Record completion of the session's episode
    pub fn finish(&mut self, session: &PlaybackSession) -> Result<ProgressRecord, StorageError> {
        self.record_completion(session.key())
    }

    /// Seek the session's device to the saved position; false without a device
    pub fn restore(&self, session: &mut PlaybackSession) -> bool {
        let position = self.record(session.key()).map(|r| r.position_seconds).unwrap_or(0.0);
        session.seek(position)
    }

    pub fn record(&self, key: &ProgressKey) -> Option<&ProgressRecord> {
        self.history.find(key)
    }

    pub fn state(&self, key: &ProgressKey) -> PlaybackState {
        match self.record(key) {
            None => PlaybackState::NotStarted,
            Some(r) if r.completed => PlaybackState::Completed,
            Some(_) => PlaybackState::InProgress,
        }
    }

    pub fn last_listened(&self) -> Option<&LastListened> {
        self.last_listened.as_ref()
    }

    pub fn completions(&self) -> &[CompletionEntry] {
        &self.history.completions
    }

    pub fn history(&self) -> &ListeningHistory {
        &self.history
    }

    fn upsert<F: FnOnce(&mut ProgressRecord)>(&mut self, key: &ProgressKey, update: F) -> ProgressRecord {
        self.revision += 1;
        let revision = self.revision;
        let now = Utc::now();

        let records = &mut self.history.records;
        let index = match records.iter().position(|r| &r.key == key) {
            Some(index) => index,
            None => {
                records.push(ProgressRecord {
                    key: key.clone(),
                    position_seconds: 0.0,
                    duration_seconds: 0.0,
                    completed: false,
                    updated_at: now,
                    revision,
                });
                records.len() - 1
            }
        };

        let record = &mut records[index];
        update(record);
        record.updated_at = now;
        record.revision = revision;
        record.clone()
    }

    fn point_at(&mut self, key: &ProgressKey, position_seconds: f64) {
        self.last_listened = Some(LastListened {
            key: key.clone(),
            position_seconds,
            updated_at: Utc::now(),
        });
    }

    fn persist_all(&self) -> Result<(), StorageError> {
        self.storage.set(LISTENING_HISTORY_KEY, &self.history)?;
        self.persist_last()
    }

    fn persist_last(&self) -> Result<(), StorageError> {
        match &self.last_listened {
            Some(last) => self.storage.set(LAST_LISTENED_KEY, last),
            None => self.storage.remove(LAST_LISTENED_KEY),
        }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(episode: &str) -> ProgressKey {
        ProgressKey::new("10", "1", episode)
    }

    #[test]
    fn test_inputs_are_clamped() {
        let mut tracker = ProgressTracker::load(Storage::memory(), CompletionPolicy::default());

        let record = tracker.record_progress(&key("a"), f64::NAN, -3.0).unwrap();
        assert_eq!(record.position_seconds, 0.0);
        assert_eq!(record.duration_seconds, 0.0);

        let record = tracker.record_progress(&key("a"), 500.0, 120.0).unwrap();
        assert_eq!(record.position_seconds, 120.0);

        // unknown duration keeps the stored one and still caps
        let record = tracker.record_progress(&key("a"), 500.0, 0.0).unwrap();
        assert_eq!(record.duration_seconds, 120.0);
        assert_eq!(record.position_seconds, 120.0);

        // no duration ever known: position is left uncapped
        let record = tracker.record_progress(&key("b"), 500.0, 0.0).unwrap();
        assert_eq!(record.position_seconds, 500.0);
    }

    #[test]
    fn test_state_machine() {
        let mut tracker = ProgressTracker::load(Storage::memory(), CompletionPolicy::default());
        let k = key("a");

        assert_eq!(tracker.state(&k), PlaybackState::NotStarted);
        tracker.record_progress(&k, 10.0, 100.0).unwrap();
        assert_eq!(tracker.state(&k), PlaybackState::InProgress);
        tracker.record_completion(&k).unwrap();
        assert_eq!(tracker.state(&k), PlaybackState::Completed);
        tracker.record_progress(&k, 5.0, 100.0).unwrap();
        assert_eq!(tracker.state(&k), PlaybackState::InProgress);
        assert_eq!(tracker.completions().len(), 1);
    }

    #[test]
    fn test_completion_policies() {
        let mut reset = ProgressTracker::load(Storage::memory(), CompletionPolicy::ResetPosition);
        reset.record_progress(&key("a"), 90.0, 100.0).unwrap();
        assert_eq!(reset.record_completion(&key("a")).unwrap().position_seconds, 0.0);

        let mut keep = ProgressTracker::load(Storage::memory(), CompletionPolicy::KeepPosition);
        keep.record_progress(&key("a"), 90.0, 100.0).unwrap();
        let record = keep.record_completion(&key("a")).unwrap();
        assert!(record.completed);
        assert_eq!(record.position_seconds, 90.0);
    }

    #[test]
    fn test_completion_without_prior_progress() {
        let mut tracker = ProgressTracker::load(Storage::memory(), CompletionPolicy::default());
        let record = tracker.record_completion(&key("fresh")).unwrap();
        assert!(record.completed);
        assert_eq!(record.duration_seconds, 0.0);
    }

    #[test]
    fn test_filter_matching() {
        let filter = ProgressFilter::show("10").with_season("1");
        assert!(filter.matches(&key("a")));
        assert!(!filter.matches(&ProgressKey::new("10", "2", "a")));
        assert!(ProgressFilter::all().is_all());
        assert!(!filter.is_all());
    }

    #[test]
    fn test_completion_policy_parsing() {
        assert_eq!("keep".parse::<CompletionPolicy>().unwrap(), CompletionPolicy::KeepPosition);
        assert_eq!(
            "reset-position".parse::<CompletionPolicy>().unwrap(),
            CompletionPolicy::ResetPosition
        );
        assert!("forever".parse::<CompletionPolicy>().is_err());
    }
}
