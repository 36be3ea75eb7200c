// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The show checker: a scheduled reconciliation of every tracked show
//! against live provider data.
//!
//! A cycle moves the durable worker state `Idle -> Running -> Idle`, records
//! one `check_all_shows` task plus one `check_show` task per unit, and only
//! then advances `last_check_time`. On start the engine closes tasks a crashed
//! run left open and waits out whatever remains of the current interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reelwatch_cache::ImageCache;
use reelwatch_config::model::CheckerConfig;
use reelwatch_core::{
    Clock, MetadataProvider, Notifier, ReelwatchError, StorageAdapter, TaskType, WorkerTask,
};
use reelwatch_resilience::RateLimiter;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::pool::{self, ShowUnit, UnitContext, UnitOutcome};
use crate::state::{self, CycleTotals};

/// External collaborators of the checker.
pub struct CheckerDeps {
    pub storage: Arc<dyn StorageAdapter>,
    pub provider: Arc<dyn MetadataProvider>,
    pub notifier: Arc<dyn Notifier>,
    /// Poster source for notifications; text-only when `None`.
    pub images: Option<Arc<ImageCache>>,
    pub clock: Arc<dyn Clock>,
}

/// Summary of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started: DateTime<Utc>,
    pub users: usize,
    pub shows_checked: i64,
    pub updates_found: i64,
    /// Units whose check failed.
    pub failures: Vec<UnitOutcome>,
}

pub struct ShowChecker {
    ctx: Arc<UnitContext>,
    workers: usize,
    fetch_timeout: Duration,
}

impl ShowChecker {
    pub fn new(config: &CheckerConfig, deps: CheckerDeps) -> Self {
        let limiter = RateLimiter::new(config.rate_per_sec, config.effective_burst());
        Self {
            ctx: Arc::new(UnitContext {
                worker_id: config.worker_id.clone(),
                storage: deps.storage,
                provider: deps.provider,
                notifier: deps.notifier,
                images: deps.images,
                limiter: Arc::new(limiter),
                clock: deps.clock,
            }),
            workers: config.workers.max(1),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.ctx.worker_id
    }

    /// How long to wait before the first cycle, given the persisted state.
    pub async fn first_cycle_delay(&self, interval: Duration) -> Duration {
        let last_check = match self.ctx.storage.get_worker_state(&self.ctx.worker_id).await {
            Ok(state) => state.and_then(|s| s.last_check_time),
            Err(e) => {
                warn!(error = %e, "failed to read worker state, checking immediately");
                None
            }
        };
        startup_delay(last_check, interval, self.ctx.clock.now())
    }

    /// Run cycles every `interval` until `cancel` fires.
    ///
    /// A cycle in progress when `cancel` fires is allowed to finish.
    pub async fn start_checking(&self, cancel: CancellationToken, interval: Duration) {
        let interval = interval.max(Duration::from_secs(1));
        let worker_id = self.worker_id();
        let storage = self.ctx.storage.as_ref();

        match storage
            .close_interrupted_tasks(worker_id, self.ctx.clock.now())
            .await
        {
            Ok(0) => {}
            Ok(closed) => warn!(worker_id, closed, "closed tasks left running by a previous run"),
            Err(e) => warn!(worker_id, error = %e, "failed to close interrupted tasks"),
        }

        let delay = self.first_cycle_delay(interval).await;
        if !delay.is_zero() {
            info!(worker_id, delay_secs = delay.as_secs(), "waiting before first check cycle");
            tokio::select! {
                _ = cancel.cancelled() => {
                    state::mark_idle(storage, worker_id, self.ctx.clock.now()).await;
                    info!(worker_id, "show checker stopped before first cycle");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(worker_id, interval_secs = interval.as_secs(), "show checker started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.run_cycle(interval).await {
                        Ok(report) => info!(
                            worker_id,
                            users = report.users,
                            shows_checked = report.shows_checked,
                            updates_found = report.updates_found,
                            failures = report.failures.len(),
                            "check cycle complete"
                        ),
                        Err(e) => error!(worker_id, error = %e, "check cycle failed"),
                    }
                }
            }
        }

        state::mark_idle(storage, worker_id, self.ctx.clock.now()).await;
        info!(worker_id, "show checker stopped");
    }

    /// Check every tracked show of every user once.
    ///
    /// Only a failure to list users aborts the cycle; everything else is
    /// logged and isolated to the unit it happened in.
    pub async fn run_cycle(&self, interval: Duration) -> Result<CycleReport, ReelwatchError> {
        let ctx = &self.ctx;
        let worker_id = ctx.worker_id.as_str();
        let storage = ctx.storage.as_ref();
        let started = ctx.clock.now();

        state::mark_running(storage, worker_id, started).await;

        let mut cycle_task = WorkerTask::start(worker_id, TaskType::CheckAllShows, started);
        if let Err(e) = storage.create_task(&cycle_task).await {
            warn!(worker_id, error = %e, "failed to record cycle task");
        }

        let users = match storage.list_users().await {
            Ok(users) => users,
            Err(e) => {
                let message = format!("failed to list users: {e}");
                let finished = ctx.clock.now();
                cycle_task.close(Some(message.clone()), finished);
                if let Err(e) = storage.update_task(&cycle_task).await {
                    warn!(worker_id, error = %e, "failed to close cycle task");
                }
                let totals = CycleTotals {
                    started,
                    finished,
                    interval,
                    shows_checked: 0,
                    updates_found: 0,
                    error: Some(message),
                };
                state::finish_cycle(storage, worker_id, &totals).await;
                return Err(e);
            }
        };

        let mut units = Vec::new();
        for user in &users {
            let Some(api_key) = user.api_key.as_deref() else {
                info!(user_id = user.id, "user has no API key, skipping their shows");
                continue;
            };
            let api_key: Arc<str> = Arc::from(api_key);
            match storage.list_tracked_shows(user.id).await {
                Ok(shows) => units.extend(shows.into_iter().map(|show| ShowUnit {
                    api_key: api_key.clone(),
                    show,
                })),
                Err(e) => warn!(user_id = user.id, error = %e, "failed to list tracked shows"),
            }
        }
        info!(worker_id, users = users.len(), units = units.len(), "check cycle started");

        let (tally, outcomes) =
            pool::run_pool(ctx.clone(), units, self.workers, self.fetch_timeout).await;
        let failures: Vec<UnitOutcome> =
            outcomes.into_iter().filter(|o| o.error.is_some()).collect();

        let finished = ctx.clock.now();
        cycle_task.shows_checked = tally.checked;
        cycle_task.updates_found = tally.updated;
        cycle_task.close(None, finished);
        if let Err(e) = storage.update_task(&cycle_task).await {
            warn!(worker_id, error = %e, "failed to close cycle task");
        }

        let totals = CycleTotals {
            started,
            finished,
            interval,
            shows_checked: tally.checked,
            updates_found: tally.updated,
            error: None,
        };
        state::finish_cycle(storage, worker_id, &totals).await;

        Ok(CycleReport {
            started,
            users: users.len(),
            shows_checked: tally.checked,
            updates_found: tally.updated,
            failures,
        })
    }
}

/// Time left until `last_check + interval`, or zero if that is not in the
/// future (or there was no previous check).
pub fn startup_delay(
    last_check: Option<DateTime<Utc>>,
    interval: Duration,
    now: DateTime<Utc>,
) -> Duration {
    last_check
        .zip(chrono::Duration::from_std(interval).ok())
        .and_then(|(last, interval)| last.checked_add_signed(interval))
        .and_then(|next| (next - now).to_std().ok())
        .unwrap_or_default()
}
