// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata provider trait (TMDB and test doubles).

use async_trait::async_trait;

use crate::error::ReelwatchError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MovieDetails, MovieSummary, ShowDetails, ShowSummary};

/// Adapter for the movie/TV metadata provider.
///
/// Every call carries the credential of the user on whose behalf it is made.
#[async_trait]
pub trait MetadataProvider: PluginAdapter {
    /// Fetches live details of a TV show, including its season count.
    async fn get_show(&self, api_key: &str, show_id: i64) -> Result<ShowDetails, ReelwatchError>;

    async fn get_movie(&self, api_key: &str, movie_id: i64)
    -> Result<MovieDetails, ReelwatchError>;

    async fn search_movies(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<MovieSummary>, ReelwatchError>;

    async fn search_shows(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<ShowSummary>, ReelwatchError>;

    /// Returns whether the credential is accepted by the provider.
    async fn validate_credential(&self, api_key: &str) -> Result<bool, ReelwatchError>;

    /// Absolute URL of a poster given the provider's relative path.
    fn poster_url(&self, poster_path: &str) -> String;
}
