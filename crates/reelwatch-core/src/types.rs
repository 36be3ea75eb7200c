// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the reelwatch workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Telegram user identity. Stable across restarts and used as the chat id
/// for private conversations.
pub type UserId = i64;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Channel,
    Provider,
    Storage,
}

/// What a free-text search resolves to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Movie,
    TvShow,
}

// --- Provider records ---

/// A movie as returned by a provider search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

/// A TV show as returned by a provider search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub id: i64,
    pub name: String,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

/// One ranked entry of a search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchItem {
    Movie(MovieSummary),
    Show(ShowSummary),
}

impl SearchItem {
    /// Provider id of the underlying title.
    pub fn id(&self) -> i64 {
        match self {
            SearchItem::Movie(m) => m.id,
            SearchItem::Show(s) => s.id,
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        match self {
            SearchItem::Movie(m) => &m.title,
            SearchItem::Show(s) => &s.name,
        }
    }

    pub fn kind(&self) -> SearchKind {
        match self {
            SearchItem::Movie(_) => SearchKind::Movie,
            SearchItem::Show(_) => SearchKind::TvShow,
        }
    }

    pub fn poster_path(&self) -> Option<&str> {
        match self {
            SearchItem::Movie(m) => m.poster_path.as_deref(),
            SearchItem::Show(s) => s.poster_path.as_deref(),
        }
    }

    /// Release year, if the provider supplied a date.
    pub fn year(&self) -> Option<&str> {
        let date = match self {
            SearchItem::Movie(m) => m.release_date.as_deref(),
            SearchItem::Show(s) => s.first_air_date.as_deref(),
        }?;
        date.get(..4).filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// Full details of a TV show; the season count is what the checker compares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetails {
    pub id: i64,
    pub name: String,
    pub seasons: i32,
    pub episodes: i32,
    /// Typical episode runtime in minutes (0 when unknown).
    pub runtime: i32,
    pub status: String,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
}

/// Full details of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub runtime: i32,
    pub status: String,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub overview: Option<String>,
}

// --- Durable records ---

/// Durable user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Provider credential supplied by the user, if any.
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A TV show a user has recorded as watched up to `seasons` seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedShow {
    pub user_id: UserId,
    pub api_show_id: i64,
    pub name: String,
    pub seasons: i32,
    pub episodes: i32,
    pub runtime: i32,
    pub status: String,
}

impl TrackedShow {
    /// Builds a tracked show from live provider data.
    pub fn from_details(user_id: UserId, details: &ShowDetails, seasons: i32) -> Self {
        Self {
            user_id,
            api_show_id: details.id,
            name: details.name.clone(),
            seasons,
            episodes: details.episodes,
            runtime: details.runtime,
            status: details.status.clone(),
        }
    }
}

/// A movie the user marked as watched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedMovie {
    pub user_id: UserId,
    pub api_movie_id: i64,
    pub title: String,
    pub runtime: i32,
    pub watched_at: DateTime<Utc>,
}

/// A title the user wants to watch later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: UserId,
    pub api_id: i64,
    pub media_type: SearchKind,
    pub title: String,
    pub added_at: DateTime<Utc>,
}

// --- Worker bookkeeping ---

/// Run state of a named background worker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Idle,
    Running,
}

/// Outcome state of a single unit of work.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Running,
    Success,
    Error,
}

/// Kind of unit of work recorded in the task log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// One full cycle over every tracked show.
    CheckAllShows,
    /// One (user, show) pair within a cycle.
    CheckShow,
}

/// Durable state of a named worker.
///
/// `shows_checked` and `updates_found` are cumulative across cycles and only
/// ever grow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState {
    pub worker_id: String,
    pub worker_type: String,
    pub status: WorkerStatus,
    pub last_check_time: Option<DateTime<Utc>>,
    pub next_check_time: Option<DateTime<Utc>>,
    pub shows_checked: i64,
    pub updates_found: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkerState {
    /// A fresh idle state for a worker that has never run.
    pub fn new(worker_id: &str, worker_type: &str, now: DateTime<Utc>) -> Self {
        Self {
            worker_id: worker_id.to_string(),
            worker_type: worker_type.to_string(),
            status: WorkerStatus::Idle,
            last_check_time: None,
            next_check_time: None,
            shows_checked: 0,
            updates_found: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Audit record of one unit of work.
///
/// Created with `status = Running`; closed exactly once via [`WorkerTask::close`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerTask {
    pub id: Uuid,
    pub worker_id: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub user_id: Option<UserId>,
    pub show_id: Option<i64>,
    pub shows_checked: i64,
    pub updates_found: i64,
    pub error: Option<String>,
}

impl WorkerTask {
    /// Opens a new running task.
    pub fn start(worker_id: &str, task_type: TaskType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            worker_id: worker_id.to_string(),
            task_type,
            status: TaskStatus::Running,
            start_time: now,
            end_time: None,
            duration_ms: None,
            user_id: None,
            show_id: None,
            shows_checked: 0,
            updates_found: 0,
            error: None,
        }
    }

    /// Attaches the (user, show) pair a `CheckShow` task is about.
    pub fn for_show(mut self, user_id: UserId, show_id: i64) -> Self {
        self.user_id = Some(user_id);
        self.show_id = Some(show_id);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status != TaskStatus::Running
    }

    /// Closes the task with a final status. Returns `false` and leaves the task
    /// untouched if it was already closed.
    pub fn close(&mut self, error: Option<String>, now: DateTime<Utc>) -> bool {
        if self.is_closed() {
            return false;
        }
        self.status = if error.is_some() {
            TaskStatus::Error
        } else {
            TaskStatus::Success
        };
        self.error = error;
        self.end_time = Some(now);
        self.duration_ms = Some((now - self.start_time).num_milliseconds().max(0));
        true
    }
}

/// A single inline button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAction {
    pub label: String,
    pub callback_data: String,
}

impl InlineAction {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}
