// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: bot flows and the show checker sharing one store.
//!
//! Each test creates an isolated TestHarness with temp SQLite and mock
//! adapters. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use reelwatch_cache::{SearchSessions, SessionCache};
use reelwatch_checker::{CheckerDeps, ShowChecker};
use reelwatch_config::model::CheckerConfig;
use reelwatch_core::{ShowDetails, ShowSummary, StorageAdapter, UserId, WorkerStatus};
use reelwatch_telegram::{BotFlows, Command};
use reelwatch_test_utils::TestHarness;

const INTERVAL: Duration = Duration::from_secs(3600);

fn flows(harness: &TestHarness) -> BotFlows {
    let sessions = Arc::new(SessionCache::new(
        harness.storage.clone(),
        harness.clock.clone(),
        Duration::from_secs(24 * 3600),
    )
    .unwrap());
    BotFlows::new(
        sessions,
        Arc::new(SearchSessions::new()),
        harness.storage.clone(),
        harness.provider.clone(),
        harness.clock.clone(),
    )
}

fn checker(harness: &TestHarness) -> ShowChecker {
    let config = CheckerConfig {
        worker_id: "e2e-checker".into(),
        ..CheckerConfig::default()
    };
    ShowChecker::new(
        &config,
        CheckerDeps {
            storage: harness.storage.clone(),
            provider: harness.provider.clone(),
            notifier: harness.notifier.clone(),
            images: None,
            clock: harness.clock.clone(),
        },
    )
}

fn severance(seasons: i32) -> ShowDetails {
    ShowDetails {
        id: 95396,
        name: "Severance".into(),
        seasons,
        episodes: seasons * 9,
        runtime: 55,
        status: "Returning Series".into(),
        poster_path: None,
        overview: Some("Mark leads a team of office workers.".into()),
    }
}

async fn register(flows: &BotFlows, user: UserId, token: &str) {
    let reply = flows.handle_command(user, Command::Start).await;
    assert!(reply.text.contains("token"));
    let reply = flows.handle_text(user, token).await;
    assert!(reply.text.contains("Token saved"), "{}", reply.text);
}

// ---- Test 1: track from search, get notified, confirm ----

#[tokio::test]
async fn track_notify_and_confirm_new_season() {
    let harness = TestHarness::new().await.unwrap();
    let flows = flows(&harness);
    let user: UserId = 1001;

    harness.provider.accept_key("tok-1").await;
    harness
        .provider
        .set_show_results(vec![ShowSummary {
            id: 95396,
            name: "Severance".into(),
            first_air_date: Some("2022-02-17".into()),
            overview: None,
            poster_path: None,
            vote_average: Some(8.4),
        }])
        .await;
    harness.provider.set_show(severance(1)).await;

    register(&flows, user, "tok-1").await;

    let reply = flows
        .handle_command(user, Command::Tv("severance".into()))
        .await;
    assert!(reply.text.contains("Severance"));
    assert_eq!(reply.keyboard[0][0].callback_data, "track:1");

    let reply = flows.handle_callback(user, "track:1").await;
    assert!(reply.text.contains("Now tracking"));

    // A second season airs.
    harness.provider.set_show(severance(2)).await;
    let report = checker(&harness).run_cycle(INTERVAL).await.unwrap();
    assert_eq!(report.users, 1);
    assert_eq!(report.shows_checked, 1);
    assert_eq!(report.updates_found, 1);

    let sent = harness.notifier.sent_to(user).await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Severance"));
    let action = sent[0].action.clone().expect("notification carries a button");
    assert_eq!(action.callback_data, "seen:95396:2");

    let reply = flows.handle_callback(user, &action.callback_data).await;
    assert!(reply.text.contains("2 seasons of Severance"));
    let stored = harness
        .storage
        .get_tracked_show(95396, user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.seasons, 2);

    // Nothing new on the next cycle.
    let report = checker(&harness).run_cycle(INTERVAL).await.unwrap();
    assert_eq!(report.updates_found, 0);
    assert_eq!(harness.notifier.sent_to(user).await.len(), 1);

    let state = harness
        .storage
        .get_worker_state("e2e-checker")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.status, WorkerStatus::Idle);
    assert_eq!(state.shows_checked, 2);
    assert_eq!(state.updates_found, 1);
}

// ---- Test 2: users without a token are ignored by the checker ----

#[tokio::test]
async fn checker_uses_each_users_own_token() {
    let harness = TestHarness::new().await.unwrap();
    let flows = flows(&harness);

    harness.provider.accept_key("tok-a").await;
    register(&flows, 1, "tok-a").await;
    harness.track_show(1, 500, "Andor", 1, 2).await.unwrap();

    // User 2 talked to the bot but never supplied a token.
    flows.handle_command(2, Command::Start).await;
    harness.track_show(2, 501, "Foundation", 1, 2).await.unwrap();

    let report = checker(&harness).run_cycle(INTERVAL).await.unwrap();
    assert_eq!(report.shows_checked, 1);
    assert_eq!(report.updates_found, 1);
    assert_eq!(harness.provider.keys_seen().await, vec!["tok-a".to_string()]);
    assert_eq!(harness.provider.show_calls(501).await, 0);
    assert!(harness.notifier.sent_to(2).await.is_empty());

    let reply = flows.handle_command(1, Command::Shows).await;
    assert!(reply.text.contains("*Andor*"));
    assert!(reply.text.contains("2 seasons watched"));
}
