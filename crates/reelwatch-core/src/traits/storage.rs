// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the durable user/show/watchlist store and
//! the worker bookkeeping tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ReelwatchError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    MovieDetails, SearchKind, TrackedShow, User, UserId, WatchlistEntry, WorkerState,
    WorkerTask,
};

/// Adapter for the persistence backend.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), ReelwatchError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), ReelwatchError>;

    // --- Users ---

    /// Lists every known user.
    async fn list_users(&self) -> Result<Vec<User>, ReelwatchError>;

    /// Loads a user's profile, creating an empty one on first contact.
    async fn get_or_create_user(&self, user_id: UserId) -> Result<User, ReelwatchError>;

    /// Returns the provider credential on file for a user, if any.
    async fn get_user_credential(&self, user_id: UserId)
    -> Result<Option<String>, ReelwatchError>;

    /// Stores (or replaces) a user's provider credential.
    async fn set_user_credential(
        &self,
        user_id: UserId,
        api_key: &str,
    ) -> Result<(), ReelwatchError>;

    // --- Tracked shows ---

    async fn list_tracked_shows(&self, user_id: UserId)
    -> Result<Vec<TrackedShow>, ReelwatchError>;

    async fn get_tracked_show(
        &self,
        api_show_id: i64,
        user_id: UserId,
    ) -> Result<Option<TrackedShow>, ReelwatchError>;

    async fn create_tracked_show(&self, show: &TrackedShow) -> Result<(), ReelwatchError>;

    /// Overwrites seasons, episodes, runtime, status and name of an existing row.
    async fn update_tracked_show(&self, show: &TrackedShow) -> Result<(), ReelwatchError>;

    // --- Watchlist ---

    async fn add_to_watchlist(&self, entry: &WatchlistEntry) -> Result<(), ReelwatchError>;

    async fn list_watchlist(&self, user_id: UserId)
    -> Result<Vec<WatchlistEntry>, ReelwatchError>;

    /// Records a movie as watched and removes it from the user's watchlist in
    /// one transaction. Either both happen or neither does.
    async fn mark_movie_watched(
        &self,
        user_id: UserId,
        movie: &MovieDetails,
        watched_at: DateTime<Utc>,
    ) -> Result<(), ReelwatchError>;

    /// Removes a title from the watchlist. Returns whether a row was removed.
    async fn remove_from_watchlist(
        &self,
        user_id: UserId,
        api_id: i64,
        media_type: SearchKind,
    ) -> Result<bool, ReelwatchError>;

    // --- Worker bookkeeping ---

    async fn get_worker_state(&self, worker_id: &str)
    -> Result<Option<WorkerState>, ReelwatchError>;

    /// Inserts or fully replaces the row for `state.worker_id`.
    async fn upsert_worker_state(&self, state: &WorkerState) -> Result<(), ReelwatchError>;

    async fn create_task(&self, task: &WorkerTask) -> Result<(), ReelwatchError>;

    async fn update_task(&self, task: &WorkerTask) -> Result<(), ReelwatchError>;

    async fn get_task(&self, id: Uuid) -> Result<Option<WorkerTask>, ReelwatchError>;

    /// Most recent tasks for a worker, newest first.
    async fn list_tasks(
        &self,
        worker_id: &str,
        limit: i64,
    ) -> Result<Vec<WorkerTask>, ReelwatchError>;

    /// Closes every task still marked running for `worker_id` as an error.
    /// Returns the number of tasks closed.
    async fn close_interrupted_tasks(
        &self,
        worker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, ReelwatchError>;
}
