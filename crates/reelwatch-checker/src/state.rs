// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-then-upsert transitions of the durable worker state.
//!
//! Failures are logged and swallowed: bookkeeping never stops a cycle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reelwatch_core::{StorageAdapter, WorkerState, WorkerStatus};
use tracing::warn;

/// Worker type recorded for the show checker.
pub const WORKER_TYPE: &str = "tv_show_checker";

async fn load(storage: &dyn StorageAdapter, worker_id: &str, now: DateTime<Utc>) -> WorkerState {
    match storage.get_worker_state(worker_id).await {
        Ok(Some(state)) => state,
        Ok(None) => WorkerState::new(worker_id, WORKER_TYPE, now),
        Err(e) => {
            warn!(worker_id, error = %e, "failed to read worker state, starting fresh");
            WorkerState::new(worker_id, WORKER_TYPE, now)
        }
    }
}

async fn save(storage: &dyn StorageAdapter, state: &WorkerState) {
    if let Err(e) = storage.upsert_worker_state(state).await {
        warn!(worker_id = %state.worker_id, error = %e, "failed to persist worker state");
    }
}

pub(crate) async fn mark_running(storage: &dyn StorageAdapter, worker_id: &str, now: DateTime<Utc>) {
    let mut state = load(storage, worker_id, now).await;
    state.status = WorkerStatus::Running;
    state.updated_at = now;
    save(storage, &state).await;
}

pub(crate) async fn mark_idle(storage: &dyn StorageAdapter, worker_id: &str, now: DateTime<Utc>) {
    let mut state = load(storage, worker_id, now).await;
    state.status = WorkerStatus::Idle;
    state.updated_at = now;
    save(storage, &state).await;
}

/// Totals of one finished cycle.
pub(crate) struct CycleTotals {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub interval: Duration,
    pub shows_checked: i64,
    pub updates_found: i64,
    pub error: Option<String>,
}

pub(crate) async fn finish_cycle(storage: &dyn StorageAdapter, worker_id: &str, totals: &CycleTotals) {
    let mut state = load(storage, worker_id, totals.finished).await;
    state.status = WorkerStatus::Idle;
    state.last_check_time = Some(totals.started);
    state.next_check_time = chrono::Duration::from_std(totals.interval)
        .ok()
        .and_then(|i| totals.started.checked_add_signed(i));
    state.shows_checked += totals.shows_checked;
    state.updates_found += totals.updates_found;
    state.last_error = totals.error.clone();
    state.updated_at = totals.finished;
    save(storage, &state).await;
}
