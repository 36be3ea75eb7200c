// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TMDB v3 response payloads and their mapping onto core types.
//!
//! Only the fields reelwatch reads are modelled; everything else is ignored.

use reelwatch_core::{MovieDetails, MovieSummary, ShowDetails, ShowSummary};
use serde::Deserialize;

/// `GET /tv/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TvDetailsResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub number_of_seasons: Option<i32>,
    #[serde(default)]
    pub number_of_episodes: Option<i32>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    #[serde(default)]
    pub last_episode_to_air: Option<EpisodeRef>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeRef {
    #[serde(default)]
    pub runtime: Option<i32>,
}

impl From<TvDetailsResponse> for ShowDetails {
    fn from(tv: TvDetailsResponse) -> Self {
        // Newer shows often leave episode_run_time empty.
        let runtime = tv
            .episode_run_time
            .first()
            .copied()
            .or_else(|| tv.last_episode_to_air.as_ref().and_then(|e| e.runtime))
            .unwrap_or(0);
        ShowDetails {
            id: tv.id,
            name: tv.name,
            seasons: tv.number_of_seasons.unwrap_or(0),
            episodes: tv.number_of_episodes.unwrap_or(0),
            runtime,
            status: tv.status.unwrap_or_default(),
            poster_path: tv.poster_path,
            overview: non_empty(tv.overview),
        }
    }
}

/// `GET /movie/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailsResponse {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl From<MovieDetailsResponse> for MovieDetails {
    fn from(m: MovieDetailsResponse) -> Self {
        MovieDetails {
            id: m.id,
            title: m.title,
            runtime: m.runtime.unwrap_or(0),
            status: m.status.unwrap_or_default(),
            release_date: non_empty(m.release_date),
            poster_path: m.poster_path,
            overview: non_empty(m.overview),
        }
    }
}

/// Envelope of `GET /search/movie` and `GET /search/tv`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieResult {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl From<MovieResult> for MovieSummary {
    fn from(m: MovieResult) -> Self {
        MovieSummary {
            id: m.id,
            title: m.title,
            release_date: non_empty(m.release_date),
            overview: non_empty(m.overview),
            poster_path: m.poster_path,
            vote_average: m.vote_average,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvResult {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl From<TvResult> for ShowSummary {
    fn from(t: TvResult) -> Self {
        ShowSummary {
            id: t.id,
            name: t.name,
            first_air_date: non_empty(t.first_air_date),
            overview: non_empty(t.overview),
            poster_path: t.poster_path,
            vote_average: t.vote_average,
        }
    }
}

/// Error body TMDB returns alongside 4xx/5xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub status_code: i32,
    #[serde(default)]
    pub status_message: String,
}

/// TMDB sends `""` for unknown dates and overviews.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
