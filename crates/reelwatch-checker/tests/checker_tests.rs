// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the show checker against temp SQLite storage.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reelwatch_cache::{ImageCache, ImageCacheError, ImageSource};
use reelwatch_checker::{CheckerDeps, ShowChecker};
use reelwatch_config::model::{CheckerConfig, ImageConfig};
use reelwatch_core::{
    Clock, ShowDetails, StorageAdapter, TaskStatus, TaskType, WorkerState, WorkerStatus,
    WorkerTask,
};
use reelwatch_test_utils::TestHarness;
use tokio_util::sync::CancellationToken;

const WORKER: &str = "tv_show_checker";
const HOUR: Duration = Duration::from_secs(3600);

fn fast_config() -> CheckerConfig {
    CheckerConfig {
        rate_per_sec: 1000,
        fetch_timeout_secs: 30,
        ..CheckerConfig::default()
    }
}

fn checker_with(h: &TestHarness, config: &CheckerConfig, images: Option<Arc<ImageCache>>) -> ShowChecker {
    ShowChecker::new(
        config,
        CheckerDeps {
            storage: h.storage.clone(),
            provider: h.provider.clone(),
            notifier: h.notifier.clone(),
            images,
            clock: h.clock.clone(),
        },
    )
}

fn checker(h: &TestHarness) -> ShowChecker {
    checker_with(h, &fast_config(), None)
}

async fn two_user_scenario() -> TestHarness {
    let h = TestHarness::new().await.unwrap();
    h.add_user(1, "key-1").await.unwrap();
    h.add_user(2, "key-2").await.unwrap();
    h.track_show(1, 100, "Show A", 2, 3).await.unwrap();
    h.track_show(2, 200, "Show B", 3, 3).await.unwrap();
    h
}

async fn wait_for_show_calls(h: &TestHarness, expected: usize, within: Duration) -> bool {
    let deadline = Instant::now() + within;
    while Instant::now() < deadline {
        if h.provider.total_show_calls().await >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn cycle_notifies_only_the_owner_of_a_grown_show() {
    let h = two_user_scenario().await;
    let report = checker(&h).run_cycle(HOUR).await.unwrap();

    assert_eq!(report.users, 2);
    assert_eq!(report.shows_checked, 2);
    assert_eq!(report.updates_found, 1);
    assert!(report.failures.is_empty());

    let sent = h.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, 1);
    assert!(sent[0].text.contains("Show A"));
    assert!(sent[0].photo.is_none(), "no poster path means a text message");
    assert_eq!(sent[0].action.as_ref().unwrap().callback_data, "seen:100:3");

    let a = h.storage.get_tracked_show(100, 1).await.unwrap().unwrap();
    assert_eq!(a.seasons, 3);
    assert_eq!(a.episodes, 30);
    assert_eq!(a.runtime, 45);
    let b = h.storage.get_tracked_show(200, 2).await.unwrap().unwrap();
    assert_eq!(b.seasons, 3);
    assert_eq!(b.episodes, 30);

    let state = h.storage.get_worker_state(WORKER).await.unwrap().unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
    assert_eq!(state.shows_checked, 2);
    assert_eq!(state.updates_found, 1);
    assert_eq!(state.last_check_time, Some(h.clock.now()));
    assert_eq!(state.next_check_time, Some(h.clock.now() + chrono::Duration::hours(1)));
    assert!(state.last_error.is_none());

    let mut keys = h.provider.keys_seen().await;
    keys.sort();
    assert_eq!(keys, vec!["key-1".to_string(), "key-2".to_string()]);
}

#[tokio::test]
async fn every_unit_and_the_cycle_get_closed_tasks() {
    let h = two_user_scenario().await;
    checker(&h).run_cycle(HOUR).await.unwrap();

    let tasks = h.storage.list_tasks(WORKER, 10).await.unwrap();
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|t| t.status == TaskStatus::Success));
    assert!(tasks.iter().all(|t| t.end_time.is_some() && t.duration_ms.is_some()));

    let cycle = tasks
        .iter()
        .find(|t| t.task_type == TaskType::CheckAllShows)
        .unwrap();
    assert_eq!(cycle.shows_checked, 2);
    assert_eq!(cycle.updates_found, 1);

    let grown = tasks.iter().find(|t| t.show_id == Some(100)).unwrap();
    assert_eq!(grown.task_type, TaskType::CheckShow);
    assert_eq!(grown.user_id, Some(1));
    assert_eq!(grown.updates_found, 1);
}

#[tokio::test]
async fn counters_accumulate_across_cycles() {
    let h = two_user_scenario().await;
    let checker = checker(&h);
    checker.run_cycle(HOUR).await.unwrap();

    h.clock.advance(chrono::Duration::hours(1));
    let second = checker.run_cycle(HOUR).await.unwrap();
    assert_eq!(second.updates_found, 0, "stored count already caught up");

    let state = h.storage.get_worker_state(WORKER).await.unwrap().unwrap();
    assert_eq!(state.shows_checked, 4);
    assert_eq!(state.updates_found, 1);
    assert_eq!(state.last_check_time, Some(h.clock.now()));
    assert_eq!(h.notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn failing_show_is_isolated() {
    let h = two_user_scenario().await;
    h.provider.fail_show(200).await;

    let report = checker(&h).run_cycle(HOUR).await.unwrap();
    assert_eq!(report.shows_checked, 2);
    assert_eq!(report.updates_found, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].show_id, 200);
    assert!(!report.failures[0].updated);

    let tasks = h.storage.list_tasks(WORKER, 10).await.unwrap();
    let failed = tasks.iter().find(|t| t.show_id == Some(200)).unwrap();
    assert_eq!(failed.status, TaskStatus::Error);
    assert!(failed.error.as_deref().unwrap().contains("mock failure"));

    let state = h.storage.get_worker_state(WORKER).await.unwrap().unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
    assert_eq!(h.notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn seasons_going_down_are_ignored() {
    let h = TestHarness::new().await.unwrap();
    h.add_user(1, "k").await.unwrap();
    h.track_show(1, 100, "Shrinking", 4, 3).await.unwrap();

    let report = checker(&h).run_cycle(HOUR).await.unwrap();
    assert_eq!(report.updates_found, 0);
    let stored = h.storage.get_tracked_show(100, 1).await.unwrap().unwrap();
    assert_eq!(stored.seasons, 4);
    assert!(h.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn users_without_a_key_are_skipped() {
    let h = TestHarness::new().await.unwrap();
    h.storage.get_or_create_user(3).await.unwrap();
    h.track_show(3, 300, "Keyless", 1, 2).await.unwrap();

    let report = checker(&h).run_cycle(HOUR).await.unwrap();
    assert_eq!(report.users, 1);
    assert_eq!(report.shows_checked, 0);
    assert_eq!(h.provider.show_calls(300).await, 0);
}

#[tokio::test]
async fn notifier_failure_still_counts_the_update() {
    let h = two_user_scenario().await;
    h.notifier.set_failing(true).await;

    let report = checker(&h).run_cycle(HOUR).await.unwrap();
    assert_eq!(report.updates_found, 1);
    let a = h.storage.get_tracked_show(100, 1).await.unwrap().unwrap();
    assert_eq!(a.seasons, 3);
}

#[tokio::test]
async fn fetch_timeout_fails_units_stuck_on_the_limiter() {
    let h = TestHarness::new().await.unwrap();
    h.add_user(1, "k").await.unwrap();
    for id in 1..=4 {
        h.track_show(1, id, &format!("Show {id}"), 1, 1).await.unwrap();
    }
    let config = CheckerConfig {
        rate_per_sec: 1,
        burst: 1,
        fetch_timeout_secs: 1,
        ..CheckerConfig::default()
    };

    let started = Instant::now();
    let report = checker_with(&h, &config, None).run_cycle(HOUR).await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));

    assert_eq!(report.shows_checked, 4);
    assert!(report.failures.len() >= 2, "got {:?}", report.failures);
    assert!(
        report
            .failures
            .iter()
            .all(|f| f.error.as_deref().unwrap().contains("cancelled"))
    );
}

#[tokio::test]
async fn restart_waits_out_the_rest_of_the_interval() {
    let h = TestHarness::new().await.unwrap();
    let mut state = WorkerState::new(WORKER, "tv_show_checker", h.clock.now());
    state.last_check_time = Some(h.clock.now() - chrono::Duration::minutes(10));
    h.storage.upsert_worker_state(&state).await.unwrap();

    let delay = checker(&h).first_cycle_delay(HOUR).await;
    assert_eq!(delay, Duration::from_secs(50 * 60));
}

#[tokio::test]
async fn start_checking_delays_then_runs_a_cycle() {
    let h = Arc::new(two_user_scenario().await);
    let mut state = WorkerState::new(WORKER, "tv_show_checker", h.clock.now());
    // Interval 2s, last check 1s ago: first cycle after ~1s.
    state.last_check_time = Some(h.clock.now() - chrono::Duration::seconds(1));
    h.storage.upsert_worker_state(&state).await.unwrap();

    let checker = Arc::new(checker(&h));
    let cancel = CancellationToken::new();
    let started = Instant::now();
    let handle = {
        let checker = checker.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { checker.start_checking(cancel, Duration::from_secs(2)).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.provider.total_show_calls().await, 0);

    assert!(wait_for_show_calls(&h, 2, Duration::from_secs(5)).await);
    assert!(started.elapsed() >= Duration::from_millis(900));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let state = h.storage.get_worker_state(WORKER).await.unwrap().unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
    assert_eq!(state.shows_checked, 2);
}

#[tokio::test]
async fn cancel_during_startup_delay_stops_promptly() {
    let h = two_user_scenario().await;
    let mut state = WorkerState::new(WORKER, "tv_show_checker", h.clock.now());
    state.last_check_time = Some(h.clock.now() - chrono::Duration::minutes(1));
    h.storage.upsert_worker_state(&state).await.unwrap();

    let checker = Arc::new(checker(&h));
    let cancel = CancellationToken::new();
    let handle = {
        let checker = checker.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { checker.start_checking(cancel, HOUR).await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(h.provider.total_show_calls().await, 0);
    let state = h.storage.get_worker_state(WORKER).await.unwrap().unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
}

#[tokio::test]
async fn start_closes_tasks_left_running() {
    let h = TestHarness::new().await.unwrap();
    let stale = WorkerTask::start(WORKER, TaskType::CheckAllShows, h.clock.now());
    h.storage.create_task(&stale).await.unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    checker(&h).start_checking(cancel, HOUR).await;

    let closed = h.storage.get_task(stale.id).await.unwrap().unwrap();
    assert_eq!(closed.status, TaskStatus::Error);
    assert_eq!(closed.error.as_deref(), Some("interrupted"));
}

/// Serves one tiny PNG for every poster URL.
struct PngSource;

#[async_trait]
impl ImageSource for PngSource {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageCacheError> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 3));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        Ok(buf.into_inner())
    }
}

struct BrokenSource;

#[async_trait]
impl ImageSource for BrokenSource {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageCacheError> {
        Err(ImageCacheError::Upstream { status: 404 })
    }
}

async fn harness_with_poster() -> TestHarness {
    let h = two_user_scenario().await;
    h.provider
        .set_show(ShowDetails {
            id: 100,
            name: "Show A".into(),
            seasons: 3,
            episodes: 30,
            runtime: 45,
            status: "Returning Series".into(),
            poster_path: Some("/a.jpg".into()),
            overview: None,
        })
        .await;
    h
}

#[tokio::test]
async fn poster_is_attached_when_available() {
    let h = harness_with_poster().await;
    let images = Arc::new(ImageCache::new(
        &ImageConfig::default(),
        Arc::new(PngSource),
        h.clock.clone(),
    ));

    checker_with(&h, &fast_config(), Some(images.clone()))
        .run_cycle(HOUR)
        .await
        .unwrap();

    let sent = h.notifier.sent_to(1).await;
    assert_eq!(sent.len(), 1);
    let photo = sent[0].photo.as_ref().expect("photo message");
    assert_eq!(&photo[..2], &[0xFF, 0xD8]);
    assert!(images.contains("https://images.mock.invalid/a.jpg").await);
}

#[tokio::test]
async fn broken_poster_falls_back_to_text() {
    let h = harness_with_poster().await;
    let images = Arc::new(ImageCache::new(
        &ImageConfig::default(),
        Arc::new(BrokenSource),
        h.clock.clone(),
    ));

    checker_with(&h, &fast_config(), Some(images))
        .run_cycle(HOUR)
        .await
        .unwrap();

    let sent = h.notifier.sent_to(1).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].photo.is_none());
    assert!(sent[0].text.contains("Show A"));
}
