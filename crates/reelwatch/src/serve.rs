// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reelwatch serve` and `reelwatch check-now`.
//!
//! Wires SQLite storage, the TMDB provider, the caches, the show checker and
//! the Telegram bot together. `serve` runs until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use reelwatch_cache::{HttpImageSource, ImageCache, SearchSessions, SessionCache};
use reelwatch_checker::{CheckerDeps, ShowChecker};
use reelwatch_config::ReelwatchConfig;
use reelwatch_config::model::CheckerConfig;
use reelwatch_core::{Clock, ReelwatchError, StorageAdapter, SystemClock};
use reelwatch_storage::SqliteStorage;
use reelwatch_telegram::{BotFlows, TelegramBot, TelegramNotifier};
use reelwatch_tmdb::TmdbProvider;
use tracing::{error, info, warn};

use crate::shutdown;

/// How long `serve` waits for a running check cycle after shutdown starts.
const CHECKER_GRACE: Duration = Duration::from_secs(30);

/// Opens and migrates the database.
pub(crate) async fn open_storage(
    config: &ReelwatchConfig,
) -> Result<Arc<SqliteStorage>, ReelwatchError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    Ok(Arc::new(storage))
}

fn checker_interval(config: &CheckerConfig) -> Duration {
    Duration::from_secs(config.interval_hours.saturating_mul(3600))
}

fn image_cache(
    config: &ReelwatchConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<ImageCache>, ReelwatchError> {
    let source = HttpImageSource::new(Duration::from_secs(config.images.fetch_timeout_secs))?;
    Ok(Arc::new(ImageCache::new(
        &config.images,
        Arc::new(source),
        clock,
    )))
}

/// Runs the `reelwatch serve` command.
pub async fn run_serve(config: ReelwatchConfig) -> Result<(), ReelwatchError> {
    init_tracing(&config.bot.log_level);
    info!(name = %config.bot.name, "starting reelwatch serve");

    let bot = TelegramBot::new(config.telegram.clone())?;
    let storage = open_storage(&config).await?;
    let provider = Arc::new(TmdbProvider::new(&config.tmdb)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = Arc::new(SessionCache::new(
        storage.clone(),
        clock.clone(),
        Duration::from_secs(config.session.ttl_hours.saturating_mul(3600)),
    )?);
    let cancel = shutdown::install_signal_handler();

    let checker_task = if config.checker.enabled {
        let checker = ShowChecker::new(
            &config.checker,
            CheckerDeps {
                storage: storage.clone(),
                provider: provider.clone(),
                notifier: Arc::new(bot.notifier()),
                images: Some(image_cache(&config, clock.clone())?),
                clock: clock.clone(),
            },
        );
        let interval = checker_interval(&config.checker);
        let token = cancel.clone();
        Some(tokio::spawn(async move {
            checker.start_checking(token, interval).await;
        }))
    } else {
        info!("show checker disabled");
        None
    };

    let flows = BotFlows::new(
        sessions,
        Arc::new(SearchSessions::new()),
        storage.clone(),
        provider,
        clock,
    );

    let result = bot.run(flows, cancel.clone()).await;
    if let Err(ref e) = result {
        error!(error = %e, "Telegram bot stopped with an error");
    }
    // The bot may stop on its own; make sure the checker follows.
    cancel.cancel();

    if let Some(handle) = checker_task {
        shutdown::join_with_grace("show-checker", handle, CHECKER_GRACE).await;
    }
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }

    info!("reelwatch serve stopped");
    result
}

/// Runs the `reelwatch check-now` command: one cycle, then exit.
pub async fn run_check_now(config: ReelwatchConfig) -> Result<(), ReelwatchError> {
    init_tracing(&config.bot.log_level);

    let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);
    let storage = open_storage(&config).await?;
    let provider = Arc::new(TmdbProvider::new(&config.tmdb)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let checker = ShowChecker::new(
        &config.checker,
        CheckerDeps {
            storage: storage.clone(),
            provider,
            notifier,
            images: Some(image_cache(&config, clock.clone())?),
            clock,
        },
    );

    let report = checker.run_cycle(checker_interval(&config.checker)).await;
    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    let report = report?;

    println!(
        "checked {} shows for {} users, {} with new seasons",
        report.shows_checked, report.users, report.updates_found
    );
    for failure in &report.failures {
        println!(
            "  failed: user {} show {}: {}",
            failure.user_id,
            failure.show_id,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reelwatch={log_level},warn")));

    // try_init: a second call (tests, check-now after serve) must not panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
