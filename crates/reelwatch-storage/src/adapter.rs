// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

use reelwatch_config::model::StorageConfig;
use reelwatch_core::types::{
    MovieDetails, SearchKind, TrackedShow, User, UserId, WatchlistEntry, WorkerState, WorkerTask,
};
use reelwatch_core::{AdapterType, HealthStatus, PluginAdapter, ReelwatchError, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage. Nothing is opened until `initialize`.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// The underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, ReelwatchError> {
        self.db
            .get()
            .ok_or_else(|| ReelwatchError::storage("storage not initialized -- call initialize() first"))
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), ReelwatchError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!(path = %self.config.database_path, "WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        if let Some(db) = self.db.get() {
            self.checkpoint(db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), ReelwatchError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| ReelwatchError::storage("storage already initialized"))?;
        info!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ReelwatchError> {
        let db = self.database()?;
        self.checkpoint(db).await
    }

    // --- Users ---

    async fn list_users(&self) -> Result<Vec<User>, ReelwatchError> {
        queries::users::list_users(self.database()?).await
    }

    async fn get_or_create_user(&self, user_id: UserId) -> Result<User, ReelwatchError> {
        queries::users::get_or_create_user(self.database()?, user_id).await
    }

    async fn get_user_credential(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, ReelwatchError> {
        queries::users::get_user_credential(self.database()?, user_id).await
    }

    async fn set_user_credential(
        &self,
        user_id: UserId,
        api_key: &str,
    ) -> Result<(), ReelwatchError> {
        queries::users::set_user_credential(self.database()?, user_id, api_key).await
    }

    // --- Tracked shows ---

    async fn list_tracked_shows(
        &self,
        user_id: UserId,
    ) -> Result<Vec<TrackedShow>, ReelwatchError> {
        queries::tracked_shows::list_tracked_shows(self.database()?, user_id).await
    }

    async fn get_tracked_show(
        &self,
        api_show_id: i64,
        user_id: UserId,
    ) -> Result<Option<TrackedShow>, ReelwatchError> {
        queries::tracked_shows::get_tracked_show(self.database()?, api_show_id, user_id).await
    }

    async fn create_tracked_show(&self, show: &TrackedShow) -> Result<(), ReelwatchError> {
        queries::tracked_shows::create_tracked_show(self.database()?, show).await
    }

    async fn update_tracked_show(&self, show: &TrackedShow) -> Result<(), ReelwatchError> {
        queries::tracked_shows::update_tracked_show(self.database()?, show).await
    }

    // --- Watchlist ---

    async fn add_to_watchlist(&self, entry: &WatchlistEntry) -> Result<(), ReelwatchError> {
        queries::watchlist::add_to_watchlist(self.database()?, entry).await
    }

    async fn list_watchlist(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchlistEntry>, ReelwatchError> {
        queries::watchlist::list_watchlist(self.database()?, user_id).await
    }

    async fn mark_movie_watched(
        &self,
        user_id: UserId,
        movie: &MovieDetails,
        watched_at: DateTime<Utc>,
    ) -> Result<(), ReelwatchError> {
        queries::watchlist::mark_movie_watched(self.database()?, user_id, movie, watched_at).await
    }

    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        api_id: i64,
        media_type: SearchKind,
    ) -> Result<bool, ReelwatchError> {
        queries::watchlist::remove_from_watchlist(self.database()?, user_id, api_id, media_type)
            .await
    }

    // --- Worker bookkeeping ---

    async fn get_worker_state(
        &self,
        worker_id: &str,
    ) -> Result<Option<WorkerState>, ReelwatchError> {
        queries::worker_state::get_worker_state(self.database()?, worker_id).await
    }

    async fn upsert_worker_state(&self, state: &WorkerState) -> Result<(), ReelwatchError> {
        queries::worker_state::upsert_worker_state(self.database()?, state).await
    }

    async fn create_task(&self, task: &WorkerTask) -> Result<(), ReelwatchError> {
        queries::worker_tasks::create_task(self.database()?, task).await
    }

    async fn update_task(&self, task: &WorkerTask) -> Result<(), ReelwatchError> {
        queries::worker_tasks::update_task(self.database()?, task).await
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<WorkerTask>, ReelwatchError> {
        queries::worker_tasks::get_task(self.database()?, id).await
    }

    async fn list_tasks(
        &self,
        worker_id: &str,
        limit: i64,
    ) -> Result<Vec<WorkerTask>, ReelwatchError> {
        queries::worker_tasks::list_tasks(self.database()?, worker_id, limit).await
    }

    async fn close_interrupted_tasks(
        &self,
        worker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, ReelwatchError> {
        queries::worker_tasks::close_interrupted_tasks(self.database()?, worker_id, now).await
    }
}
