// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TMDB metadata provider adapter for reelwatch.
//!
//! This crate implements [`MetadataProvider`] for the TMDB v3 API: show and
//! movie details, title search, and credential validation. Each call carries
//! the calling user's own API token.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use reelwatch_config::model::TmdbConfig;
use reelwatch_core::traits::{MetadataProvider, PluginAdapter};
use reelwatch_core::types::{
    AdapterType, HealthStatus, MovieDetails, MovieSummary, ShowDetails, ShowSummary,
};
use reelwatch_core::ReelwatchError;
use reqwest::StatusCode;
use tracing::debug;

use crate::client::TmdbClient;
use crate::types::{
    MovieDetailsResponse, MovieResult, SearchResponse, TvDetailsResponse, TvResult,
};

/// TMDB provider implementing [`MetadataProvider`].
pub struct TmdbProvider {
    client: TmdbClient,
    image_base_url: String,
}

impl TmdbProvider {
    pub fn new(config: &TmdbConfig) -> Result<Self, ReelwatchError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = TmdbClient::new(&config.api_base_url, timeout)?;
        Ok(Self {
            client,
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for TmdbProvider {
    fn name(&self) -> &str {
        "tmdb"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ReelwatchError> {
        // Credentials are per user, so there is nothing to probe without one.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ReelwatchError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataProvider for TmdbProvider {
    async fn get_show(&self, api_key: &str, show_id: i64) -> Result<ShowDetails, ReelwatchError> {
        let tv: TvDetailsResponse = self
            .client
            .get_json(api_key, &format!("/tv/{show_id}"), &[])
            .await?;
        Ok(tv.into())
    }

    async fn get_movie(
        &self,
        api_key: &str,
        movie_id: i64,
    ) -> Result<MovieDetails, ReelwatchError> {
        let movie: MovieDetailsResponse = self
            .client
            .get_json(api_key, &format!("/movie/{movie_id}"), &[])
            .await?;
        Ok(movie.into())
    }

    async fn search_movies(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<MovieSummary>, ReelwatchError> {
        let page: SearchResponse<MovieResult> = self
            .client
            .get_json(api_key, "/search/movie", &[("query", query)])
            .await?;
        debug!(query, total = page.total_results, "movie search");
        Ok(page.results.into_iter().map(Into::into).collect())
    }

    async fn search_shows(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<ShowSummary>, ReelwatchError> {
        let page: SearchResponse<TvResult> = self
            .client
            .get_json(api_key, "/search/tv", &[("query", query)])
            .await?;
        debug!(query, total = page.total_results, "tv search");
        Ok(page.results.into_iter().map(Into::into).collect())
    }

    async fn validate_credential(&self, api_key: &str) -> Result<bool, ReelwatchError> {
        match self.client.get_status(api_key, "/authentication").await? {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => Err(ReelwatchError::provider(format!(
                "TMDB credential check returned {status}"
            ))),
        }
    }

    fn poster_url(&self, poster_path: &str) -> String {
        if poster_path.starts_with('/') {
            format!("{}{poster_path}", self.image_base_url)
        } else {
            format!("{}/{poster_path}", self.image_base_url)
        }
    }
}
