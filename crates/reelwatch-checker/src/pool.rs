// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded worker pool that checks one (user, show) unit at a time per worker.
//!
//! The producer feeds a bounded queue shared by the workers. Each worker
//! returns its tally through its join handle and reports every unit on a
//! result channel sized to hold all of them, which is drained only after the
//! whole pool has joined.

use std::sync::Arc;
use std::time::Duration;

use reelwatch_cache::ImageCache;
use reelwatch_core::{
    Clock, MetadataProvider, Notifier, ReelwatchError, StorageAdapter, TaskType, TrackedShow,
    UserId, WorkerTask,
};
use reelwatch_resilience::RateLimiter;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::notify;

/// Collaborators shared by every worker.
pub struct UnitContext {
    pub worker_id: String,
    pub storage: Arc<dyn StorageAdapter>,
    pub provider: Arc<dyn MetadataProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub images: Option<Arc<ImageCache>>,
    pub limiter: Arc<RateLimiter>,
    pub clock: Arc<dyn Clock>,
}

/// One tracked show of one user, checked with that user's credential.
#[derive(Debug, Clone)]
pub struct ShowUnit {
    pub api_key: Arc<str>,
    pub show: TrackedShow,
}

/// Result of checking one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub user_id: UserId,
    pub show_id: i64,
    pub updated: bool,
    pub error: Option<String>,
}

/// Per-worker counters returned through the join handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub checked: i64,
    pub updated: i64,
}

impl std::ops::AddAssign for Tally {
    fn add_assign(&mut self, other: Self) {
        self.checked += other.checked;
        self.updated += other.updated;
    }
}

/// Check every unit on a pool of `workers` tasks and wait for all of them.
///
/// Limiter waits are abandoned once `fetch_timeout` elapses; the affected
/// units are reported as failed.
pub async fn run_pool(
    ctx: Arc<UnitContext>,
    units: Vec<ShowUnit>,
    workers: usize,
    fetch_timeout: Duration,
) -> (Tally, Vec<UnitOutcome>) {
    let workers = workers.max(1);
    let (queue_tx, queue_rx) = mpsc::channel::<ShowUnit>(workers * 2);
    let queue_rx = Arc::new(Mutex::new(queue_rx));
    let (results_tx, mut results_rx) = mpsc::channel::<UnitOutcome>(units.len().max(1));

    let fetch_cancel = CancellationToken::new();
    let deadline = {
        let token = fetch_cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(fetch_timeout).await;
            warn!(timeout_secs = fetch_timeout.as_secs(), "fetch phase timed out");
            token.cancel();
        })
    };

    let mut pool = JoinSet::new();
    for worker in 0..workers {
        pool.spawn(worker_loop(
            worker,
            ctx.clone(),
            queue_rx.clone(),
            results_tx.clone(),
            fetch_cancel.clone(),
        ));
    }
    drop(results_tx);

    for unit in units {
        if queue_tx.send(unit).await.is_err() {
            error!("all show workers exited early");
            break;
        }
    }
    drop(queue_tx);

    let mut tally = Tally::default();
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(worker_tally) => tally += worker_tally,
            Err(e) => error!(error = %e, "show worker panicked"),
        }
    }
    deadline.abort();

    let mut outcomes = Vec::new();
    while let Some(outcome) = results_rx.recv().await {
        outcomes.push(outcome);
    }
    (tally, outcomes)
}

async fn worker_loop(
    worker: usize,
    ctx: Arc<UnitContext>,
    queue: Arc<Mutex<mpsc::Receiver<ShowUnit>>>,
    results: mpsc::Sender<UnitOutcome>,
    cancel: CancellationToken,
) -> Tally {
    let mut tally = Tally::default();
    loop {
        // Guard dropped before the unit runs so other workers can pull.
        let next = queue.lock().await.recv().await;
        let Some(unit) = next else { break };

        let outcome = check_unit(&ctx, unit, &cancel).await;
        tally.checked += 1;
        if outcome.updated {
            tally.updated += 1;
        }
        if results.try_send(outcome).is_err() {
            warn!(worker, "result channel full, dropping unit outcome");
        }
    }
    debug!(worker, checked = tally.checked, updated = tally.updated, "show worker done");
    tally
}

/// Check one unit and record it as its own closed task.
async fn check_unit(ctx: &UnitContext, unit: ShowUnit, cancel: &CancellationToken) -> UnitOutcome {
    let user_id = unit.show.user_id;
    let show_id = unit.show.api_show_id;

    let mut task = WorkerTask::start(&ctx.worker_id, TaskType::CheckShow, ctx.clock.now())
        .for_show(user_id, show_id);
    if let Err(e) = ctx.storage.create_task(&task).await {
        warn!(user_id, show_id, error = %e, "failed to record show task");
    }

    let result = check_show(ctx, &unit, cancel).await;
    let (updated, error) = match result {
        Ok(updated) => (updated, None),
        Err(e) => {
            warn!(user_id, show_id, error = %e, "show check failed");
            (false, Some(e.to_string()))
        }
    };

    task.shows_checked = 1;
    task.updates_found = i64::from(updated);
    task.close(error.clone(), ctx.clock.now());
    if let Err(e) = ctx.storage.update_task(&task).await {
        warn!(user_id, show_id, error = %e, "failed to close show task");
    }

    UnitOutcome {
        user_id,
        show_id,
        updated,
        error,
    }
}

/// Returns whether a new season was found.
async fn check_show(
    ctx: &UnitContext,
    unit: &ShowUnit,
    cancel: &CancellationToken,
) -> Result<bool, ReelwatchError> {
    ctx.limiter.acquire(cancel).await?;
    let stored = &unit.show;
    let live = ctx.provider.get_show(&unit.api_key, stored.api_show_id).await?;

    if live.seasons <= stored.seasons {
        debug!(
            user_id = stored.user_id,
            show_id = stored.api_show_id,
            seasons = live.seasons,
            "no new season"
        );
        return Ok(false);
    }

    let mut grown = stored.clone();
    grown.seasons = live.seasons;
    grown.episodes = live.episodes;
    grown.runtime = live.runtime;
    ctx.storage.update_tracked_show(&grown).await?;

    notify::notify_new_season(ctx, stored, &live).await;
    Ok(true)
}
