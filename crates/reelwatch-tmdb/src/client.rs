// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the TMDB v3 API.
//!
//! Provides [`TmdbClient`] which handles bearer authentication, request
//! construction, and transient error retry. The credential is per call since
//! every bot user supplies their own.

use std::time::Duration;

use reelwatch_core::ReelwatchError;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// HTTP client for TMDB communication.
///
/// Retries once after one second on 429, 500 and 503.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl TmdbClient {
    /// Creates a client against `base_url` (e.g. `https://api.themoviedb.org/3`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ReelwatchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ReelwatchError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and deserialize a successful JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ReelwatchError> {
        let response = self.send(api_key, path, query).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ReelwatchError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| ReelwatchError::Provider {
            message: format!("failed to parse TMDB response for {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// GET `path` and return only the final status code.
    pub async fn get_status(
        &self,
        api_key: &str,
        path: &str,
    ) -> Result<StatusCode, ReelwatchError> {
        let response = self.send(api_key, path, &[]).await?;
        Ok(response.status())
    }

    /// Sends the request, retrying transient failures. Returns the last
    /// response whatever its status.
    async fn send(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ReelwatchError> {
        let raw = format!("{}{}", self.base_url, path);
        let parsed = if query.is_empty() {
            reqwest::Url::parse(&raw)
        } else {
            reqwest::Url::parse_with_params(&raw, query)
        };
        let url = parsed.map_err(|e| ReelwatchError::Provider {
            message: format!("invalid TMDB URL for {path}: {e}"),
            source: Some(Box::new(e)),
        })?;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                warn!(attempt, path, "retrying TMDB request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .get(url.clone())
                .bearer_auth(api_key)
                .send()
                .await
                .map_err(|e| ReelwatchError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, path, "TMDB response received");

            if is_transient_error(status) && attempt < self.max_retries {
                attempt += 1;
                continue;
            }
            return Ok(response);
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> ReelwatchError {
    let message = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) if !err.status_message.is_empty() => format!(
            "TMDB API error {status} (code {}): {}",
            err.status_code, err.status_message
        ),
        _ => format!("TMDB returned {status}: {body}"),
    };
    ReelwatchError::provider(message)
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
