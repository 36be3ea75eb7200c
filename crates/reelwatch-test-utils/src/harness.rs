// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring temp SQLite storage to the mock adapters.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use reelwatch_config::model::StorageConfig;
use reelwatch_core::types::{ShowDetails, TrackedShow, UserId};
use reelwatch_core::{ReelwatchError, StorageAdapter};
use reelwatch_storage::SqliteStorage;

use crate::clock::ManualClock;
use crate::mock_notifier::MockNotifier;
use crate::mock_provider::MockMetadataProvider;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    start: DateTime<Utc>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            start: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Initial time of the manual clock.
    pub fn with_start_time(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    pub async fn build(self) -> Result<TestHarness, ReelwatchError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| ReelwatchError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        });
        storage.initialize().await?;

        Ok(TestHarness {
            storage: Arc::new(storage),
            provider: Arc::new(MockMetadataProvider::new()),
            notifier: Arc::new(MockNotifier::new()),
            clock: Arc::new(ManualClock::new(self.start)),
            _temp_dir: temp_dir,
        })
    }
}

/// Temp storage plus mocks, cleaned up on drop.
pub struct TestHarness {
    /// SQLite storage on a temp database.
    pub storage: Arc<SqliteStorage>,
    pub provider: Arc<MockMetadataProvider>,
    pub notifier: Arc<MockNotifier>,
    pub clock: Arc<ManualClock>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn new() -> Result<Self, ReelwatchError> {
        Self::builder().build().await
    }

    /// Create a user that has supplied `api_key`.
    pub async fn add_user(&self, user_id: UserId, api_key: &str) -> Result<(), ReelwatchError> {
        self.storage.get_or_create_user(user_id).await?;
        self.storage.set_user_credential(user_id, api_key).await
    }

    /// Record that `user_id` watched `seasons` seasons of a show, and script
    /// the provider to report `live_seasons` for it.
    pub async fn track_show(
        &self,
        user_id: UserId,
        show_id: i64,
        name: &str,
        seasons: i32,
        live_seasons: i32,
    ) -> Result<(), ReelwatchError> {
        let live = ShowDetails {
            id: show_id,
            name: name.to_string(),
            seasons: live_seasons,
            episodes: live_seasons * 10,
            runtime: 45,
            status: "Returning Series".to_string(),
            poster_path: None,
            overview: None,
        };
        let mut stored = TrackedShow::from_details(user_id, &live, seasons);
        stored.episodes = seasons * 10;
        self.storage.create_tracked_show(&stored).await?;
        self.provider.set_show(live).await;
        Ok(())
    }
}
