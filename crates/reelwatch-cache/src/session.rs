// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user interactive session records.
//!
//! A [`SessionRecord`] tracks whether the bot is waiting for the user's API
//! token or for free-text search input. Records are created lazily from the
//! durable user profile and expire after a sliding TTL: every `fetch` or
//! targeted update of a live record pushes its expiry out again. Expired
//! records are transparently rebuilt on the next [`SessionCache::fetch`].
//! They are never deleted explicitly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reelwatch_core::{Clock, ReelwatchError, SearchKind, StorageAdapter, UserId};
use tokio::sync::RwLock;
use tracing::debug;

/// Whether the user still has to supply their API token, and the cached token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthTokenState {
    pub waiting: bool,
    pub value: Option<String>,
}

/// What the next free-text message from the user means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    Idle,
    Waiting(SearchKind),
}

impl SearchState {
    pub fn waiting(&self) -> bool {
        matches!(self, SearchState::Waiting(_))
    }

    pub fn is_movie(&self) -> bool {
        matches!(self, SearchState::Waiting(SearchKind::Movie))
    }

    pub fn is_tv_show(&self) -> bool {
        matches!(self, SearchState::Waiting(SearchKind::TvShow))
    }
}

/// Short-lived interactive state of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub auth_token: AuthTokenState,
    pub search_state: SearchState,
}

impl SessionRecord {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }
}

/// In-memory session records keyed by user.
///
/// Durable reads happen outside the lock; only the install runs under the
/// write lock.
pub struct SessionCache {
    records: RwLock<HashMap<UserId, SessionRecord>>,
    storage: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
}

impl SessionCache {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Result<Self, ReelwatchError> {
        Ok(Self {
            records: RwLock::new(HashMap::new()),
            storage,
            clock,
            ttl: session_ttl(ttl)?,
        })
    }

    /// The live record for a user, or `None` if absent or expired.
    pub async fn get(&self, user_id: UserId) -> Option<SessionRecord> {
        let now = self.clock.now();
        self.records
            .read()
            .await
            .get(&user_id)
            .filter(|r| r.is_live(now))
            .cloned()
    }

    /// The live record for a user, building one from storage if needed.
    ///
    /// A live record has its expiry extended. Two concurrent fetches for the
    /// same user may both read storage, but only the first install wins and
    /// both callers see that record.
    pub async fn fetch(&self, user_id: UserId) -> Result<SessionRecord, ReelwatchError> {
        if let Some(record) = self.touch(user_id).await {
            return Ok(record);
        }

        let user = self.storage.get_or_create_user(user_id).await?;
        let now = self.clock.now();
        let fresh = SessionRecord {
            active: true,
            expires_at: now + self.ttl,
            auth_token: AuthTokenState {
                waiting: user.api_key.is_none(),
                value: user.api_key,
            },
            search_state: SearchState::Idle,
        };

        let mut records = self.records.write().await;
        if let Some(existing) = records.get_mut(&user_id).filter(|r| r.is_live(now)) {
            existing.expires_at = now + self.ttl;
            return Ok(existing.clone());
        }
        records.insert(user_id, fresh.clone());
        debug!(user_id, expires_at = %fresh.expires_at, "session created");
        Ok(fresh)
    }

    /// Overwrite a user's record.
    ///
    /// When `token_waiting` is false the token value is re-read from storage.
    pub async fn set(
        &self,
        user_id: UserId,
        active: bool,
        ttl: Duration,
        token_waiting: bool,
    ) -> Result<(), ReelwatchError> {
        let ttl = session_ttl(ttl)?;
        let value = if token_waiting {
            None
        } else {
            self.storage.get_user_credential(user_id).await?
        };
        let record = SessionRecord {
            active,
            expires_at: self.clock.now() + ttl,
            auth_token: AuthTokenState {
                waiting: token_waiting,
                value,
            },
            search_state: SearchState::Idle,
        };
        self.records.write().await.insert(user_id, record);
        Ok(())
    }

    /// Set whether the bot is waiting for the user's token.
    pub async fn update_token_state(&self, user_id: UserId, waiting: bool) -> bool {
        self.mutate(user_id, "update_token_state", |r| r.auth_token.waiting = waiting)
            .await
    }

    /// Cache a freshly persisted token and stop waiting for one.
    pub async fn store_token(&self, user_id: UserId, value: &str) -> bool {
        let value = value.to_string();
        self.mutate(user_id, "store_token", move |r| {
            r.auth_token = AuthTokenState {
                waiting: false,
                value: Some(value),
            };
        })
        .await
    }

    /// Expect the next free-text message to be a search of `kind`.
    pub async fn set_search_waiting(&self, user_id: UserId, kind: SearchKind) -> bool {
        self.mutate(user_id, "set_search_waiting", |r| {
            r.search_state = SearchState::Waiting(kind)
        })
        .await
    }

    pub async fn clear_search_waiting(&self, user_id: UserId) -> bool {
        self.mutate(user_id, "clear_search_waiting", |r| {
            r.search_state = SearchState::Idle
        })
        .await
    }

    /// Extend a live record's expiry and return it.
    async fn touch(&self, user_id: UserId) -> Option<SessionRecord> {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        let record = records.get_mut(&user_id).filter(|r| r.is_live(now))?;
        record.expires_at = now + self.ttl;
        Some(record.clone())
    }

    /// Apply `f` to a live record and extend its expiry. Absent or expired
    /// records are left alone.
    async fn mutate<F>(&self, user_id: UserId, op: &'static str, f: F) -> bool
    where
        F: FnOnce(&mut SessionRecord),
    {
        let now = self.clock.now();
        let mut records = self.records.write().await;
        match records.get_mut(&user_id) {
            Some(record) if record.is_live(now) => {
                f(record);
                record.expires_at = now + self.ttl;
                true
            }
            _ => {
                debug!(user_id, op, "no live session, ignoring");
                false
            }
        }
    }
}

fn session_ttl(ttl: Duration) -> Result<chrono::Duration, ReelwatchError> {
    chrono::Duration::from_std(ttl)
        .map_err(|_| ReelwatchError::Config(format!("session TTL {ttl:?} is out of range")))
}
