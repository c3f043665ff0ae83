//! Catalog Store Integration Tests
//!
//! Loading status, failure handling, detail caching and overlapping
//! fetches under both stale-response policies.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{detailed_show, episode, show, ScriptedSource, StaticSource};
use podshelf::catalog::{CatalogStore, FetchError, StalePolicy};
use podshelf::domain::{SeasonId, Show, ShowId};
use tokio_test::{assert_pending, assert_ready_ok, task};

fn titles(shows: &[Show]) -> Vec<String> {
    shows.iter().map(|s| s.title.clone()).collect()
}

#[tokio::test]
async fn test_load_catalog_replaces_snapshot() {
    let source = Arc::new(StaticSource::new(vec![show("1", "One", "2024-01-01")]));
    let store = CatalogStore::new(source.clone());

    assert!(store.snapshot().is_empty());
    let before = store.snapshot();

    store.load_catalog().await.unwrap();
    *source.shows.lock().unwrap() = vec![show("2", "Two", "2024-01-01"), show("3", "Three", "2024-01-01")];
    store.load_catalog().await.unwrap();

    // earlier snapshots are unaffected by later loads
    assert!(before.is_empty());
    assert_eq!(titles(&store.snapshot().shows), vec!["Two", "Three"]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_network_failure_keeps_cache_until_next_success() {
    let source = Arc::new(StaticSource::new(vec![show("1", "One", "2024-01-01")]));
    let store = CatalogStore::new(source.clone());
    store.load_catalog().await.unwrap();

    source.set_offline(true);
    let err = store.load_catalog().await.unwrap_err();
    assert!(matches!(err, FetchError::Unavailable(_)));

    let status = store.status();
    assert!(!status.loading);
    assert!(status.error.is_some());
    assert_eq!(store.snapshot().len(), 1);

    // not retried automatically
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    source.set_offline(false);
    store.load_catalog().await.unwrap();
    assert!(store.status().error.is_none());
}

#[tokio::test]
async fn test_show_detail_cached_beside_previews() {
    let source = Arc::new(
        StaticSource::new(vec![show("10", "Ten", "2024-01-01")])
            .with_detail(detailed_show("10", "Ten", 2, 3)),
    );
    let store = CatalogStore::new(source);
    store.load_catalog().await.unwrap();

    let id = ShowId::new("10");
    let detail = store.load_show_detail(&id).await.unwrap();
    assert_eq!(detail.seasons.count(), 2);
    assert!(store.detail(&id).unwrap().is_expanded());

    // the list preview is left as fetched
    assert!(!store.show(&id).unwrap().is_expanded());

    let episodes = store.load_episodes(&id, &SeasonId::from_number(2)).await.unwrap();
    assert_eq!(episodes.len(), 3);
    assert!(episodes.iter().all(|e| e.season_id.as_str() == "2"));
}

fn renamed_episodes(show_id: &str, season: u32, count: u32) -> Vec<podshelf::domain::Episode> {
    (1..=count)
        .map(|n| {
            let mut ep = episode(show_id, season, n);
            ep.title = format!("Remastered {}", n);
            ep
        })
        .collect()
}

#[tokio::test]
async fn test_load_episodes_replaces_season_in_cached_detail() {
    let fresh = renamed_episodes("10", 2, 4);
    let source = Arc::new(
        StaticSource::new(vec![show("10", "Ten", "2024-01-01")])
            .with_detail(detailed_show("10", "Ten", 2, 3))
            .with_episodes("10", 2, fresh.clone()),
    );
    let store = CatalogStore::new(source);

    let id = ShowId::new("10");
    store.load_show_detail(&id).await.unwrap();
    let before = store.detail(&id).unwrap();

    let episodes = store.load_episodes(&id, &SeasonId::from_number(2)).await.unwrap();
    assert_eq!(episodes, fresh);

    let detail = store.detail(&id).unwrap();
    assert_eq!(detail.season(&SeasonId::from_number(2)).unwrap().episodes, fresh);

    // other seasons untouched, earlier snapshot of the detail unaffected
    assert_eq!(
        detail.season(&SeasonId::from_number(1)).unwrap().episodes,
        before.season(&SeasonId::from_number(1)).unwrap().episodes
    );
    assert_eq!(before.season(&SeasonId::from_number(2)).unwrap().episodes.len(), 3);
}

#[tokio::test]
async fn test_load_episodes_outside_cached_detail_leaves_details_alone() {
    let source = Arc::new(
        StaticSource::new(vec![show("10", "Ten", "2024-01-01"), show("20", "Twenty", "2024-01-01")])
            .with_detail(detailed_show("10", "Ten", 2, 3))
            .with_episodes("10", 9, renamed_episodes("10", 9, 2))
            .with_episodes("20", 1, renamed_episodes("20", 1, 2)),
    );
    let store = CatalogStore::new(source);

    let id = ShowId::new("10");
    store.load_show_detail(&id).await.unwrap();
    let before = store.detail(&id).unwrap();

    // season unknown to the detail
    let episodes = store.load_episodes(&id, &SeasonId::from_number(9)).await.unwrap();
    assert_eq!(episodes.len(), 2);
    let after = store.detail(&id).unwrap();
    assert_eq!(*after, *before);
    assert!(after.season(&SeasonId::from_number(9)).is_none());

    // show with no cached detail
    let other = ShowId::new("20");
    let episodes = store.load_episodes(&other, &SeasonId::from_number(1)).await.unwrap();
    assert_eq!(episodes.len(), 2);
    assert!(store.detail(&other).is_none());
}

#[tokio::test]
async fn test_unknown_show_detail_sets_error() {
    let store = CatalogStore::new(Arc::new(StaticSource::new(Vec::new())));

    let err = store.load_show_detail(&ShowId::new("404")).await.unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)));
    assert!(store.status().error.unwrap().contains("404"));
}

#[test]
fn test_loading_flag_tracks_in_flight_loads() {
    let source = Arc::new(ScriptedSource::default());
    let store = CatalogStore::new(source.clone());
    let reply = source.expect_fetch();

    let mut load = task::spawn(store.load_catalog());
    assert_pending!(load.poll());
    assert!(store.status().loading);

    reply.send(Ok(vec![show("1", "One", "2024-01-01")])).unwrap();
    assert!(load.is_woken());
    assert_ready_ok!(load.poll());
    drop(load);

    assert!(!store.status().loading);
    assert_eq!(store.snapshot().len(), 1);
}

/// Issue two loads, then answer the newer one first and the older one last
fn race(policy: StalePolicy) -> (Vec<String>, Vec<String>) {
    let source = Arc::new(ScriptedSource::default());
    let store = CatalogStore::with_policy(source.clone(), policy);

    let older_reply = source.expect_fetch();
    let newer_reply = source.expect_fetch();

    let mut older = task::spawn(store.load_catalog());
    let mut newer = task::spawn(store.load_catalog());
    assert_pending!(older.poll());
    assert_pending!(newer.poll());

    newer_reply
        .send(Ok(vec![show("1", "Fresh", "2024-02-01")]))
        .unwrap();
    let newer_result = assert_ready_ok!(newer.poll());

    older_reply
        .send(Ok(vec![show("1", "Stale", "2024-01-01")]))
        .unwrap();
    let older_result = assert_ready_ok!(older.poll());

    // both callers get their own response either way
    assert_eq!(titles(&newer_result.shows), vec!["Fresh"]);
    assert_eq!(titles(&older_result.shows), vec!["Stale"]);

    drop(older);
    drop(newer);
    assert!(!store.status().loading);

    let applied = titles(&store.snapshot().shows);
    (applied, titles(&newer_result.shows))
}

#[test]
fn test_last_response_wins_lets_stale_overwrite() {
    let (applied, _) = race(StalePolicy::LastResponseWins);
    assert_eq!(applied, vec!["Stale"]);
}

#[test]
fn test_drop_superseded_keeps_newest_request() {
    let (applied, newest) = race(StalePolicy::DropSuperseded);
    assert_eq!(applied, newest);
    assert_eq!(applied, vec!["Fresh"]);
}

#[test]
fn test_superseded_failure_does_not_set_error() {
    let source = Arc::new(ScriptedSource::default());
    let store = CatalogStore::with_policy(source.clone(), StalePolicy::DropSuperseded);

    let older_reply = source.expect_fetch();
    let newer_reply = source.expect_fetch();

    let mut older = task::spawn(store.load_catalog());
    let mut newer = task::spawn(store.load_catalog());
    assert_pending!(older.poll());
    assert_pending!(newer.poll());

    newer_reply.send(Ok(vec![show("1", "Fresh", "2024-02-01")])).unwrap();
    assert_ready_ok!(newer.poll());

    older_reply
        .send(Err(FetchError::Unavailable("timeout".to_string())))
        .unwrap();
    assert!(matches!(older.poll(), std::task::Poll::Ready(Err(_))));

    assert!(store.status().error.is_none());
    assert_eq!(titles(&store.snapshot().shows), vec!["Fresh"]);
}
