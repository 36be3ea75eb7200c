// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock metadata provider for deterministic testing.
//!
//! `MockMetadataProvider` implements `MetadataProvider` from in-memory tables
//! and counts every show lookup so tests can assert on provider traffic.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use reelwatch_core::traits::adapter::PluginAdapter;
use reelwatch_core::traits::provider::MetadataProvider;
use reelwatch_core::types::{
    AdapterType, HealthStatus, MovieDetails, MovieSummary, ShowDetails, ShowSummary,
};
use reelwatch_core::ReelwatchError;

/// Base URL prepended to poster paths by the mock.
pub const MOCK_IMAGE_BASE: &str = "https://images.mock.invalid";

#[derive(Default)]
struct State {
    shows: HashMap<i64, ShowDetails>,
    movies: HashMap<i64, MovieDetails>,
    failing_shows: HashSet<i64>,
    movie_results: Vec<MovieSummary>,
    show_results: Vec<ShowSummary>,
    valid_keys: HashSet<String>,
    show_calls: HashMap<i64, usize>,
    keys_seen: Vec<String>,
}

/// A metadata provider backed by scripted tables.
#[derive(Default)]
pub struct MockMetadataProvider {
    state: Mutex<State>,
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `get_show` return `show` for its id.
    pub async fn set_show(&self, show: ShowDetails) {
        self.state.lock().await.shows.insert(show.id, show);
    }

    /// Make every `get_show` for `show_id` fail.
    pub async fn fail_show(&self, show_id: i64) {
        self.state.lock().await.failing_shows.insert(show_id);
    }

    pub async fn set_movie(&self, movie: MovieDetails) {
        self.state.lock().await.movies.insert(movie.id, movie);
    }

    /// Results returned by every movie search.
    pub async fn set_movie_results(&self, results: Vec<MovieSummary>) {
        self.state.lock().await.movie_results = results;
    }

    /// Results returned by every TV search.
    pub async fn set_show_results(&self, results: Vec<ShowSummary>) {
        self.state.lock().await.show_results = results;
    }

    /// Accept `key` in `validate_credential`.
    pub async fn accept_key(&self, key: &str) {
        self.state.lock().await.valid_keys.insert(key.to_string());
    }

    /// Number of `get_show` calls made for `show_id`.
    pub async fn show_calls(&self, show_id: i64) -> usize {
        self.state
            .lock()
            .await
            .show_calls
            .get(&show_id)
            .copied()
            .unwrap_or(0)
    }

    /// Total `get_show` calls.
    pub async fn total_show_calls(&self) -> usize {
        self.state.lock().await.show_calls.values().sum()
    }

    /// API keys passed to `get_show`, in call order.
    pub async fn keys_seen(&self) -> Vec<String> {
        self.state.lock().await.keys_seen.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockMetadataProvider {
    fn name(&self) -> &str {
        "mock-metadata"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn get_show(&self, api_key: &str, show_id: i64) -> Result<ShowDetails, ReelwatchError> {
        let mut state = self.state.lock().await;
        *state.show_calls.entry(show_id).or_default() += 1;
        state.keys_seen.push(api_key.to_string());

        if state.failing_shows.contains(&show_id) {
            return Err(ReelwatchError::provider(format!(
                "mock failure for show {show_id}"
            )));
        }
        state
            .shows
            .get(&show_id)
            .cloned()
            .ok_or_else(|| ReelwatchError::provider(format!("show {show_id} not found")))
    }

    async fn get_movie(&self, _api_key: &str, movie_id: i64) -> Result<MovieDetails, ReelwatchError> {
        self.state
            .lock()
            .await
            .movies
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| ReelwatchError::provider(format!("movie {movie_id} not found")))
    }

    async fn search_movies(
        &self,
        _api_key: &str,
        _query: &str,
    ) -> Result<Vec<MovieSummary>, ReelwatchError> {
        Ok(self.state.lock().await.movie_results.clone())
    }

    async fn search_shows(
        &self,
        _api_key: &str,
        _query: &str,
    ) -> Result<Vec<ShowSummary>, ReelwatchError> {
        Ok(self.state.lock().await.show_results.clone())
    }

    async fn validate_credential(&self, api_key: &str) -> Result<bool, ReelwatchError> {
        Ok(self.state.lock().await.valid_keys.contains(api_key))
    }

    fn poster_url(&self, poster_path: &str) -> String {
        format!("{MOCK_IMAGE_BASE}{poster_path}")
    }
}
