// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: non-empty paths,
//! positive intervals and pool sizes, sane image bounds.

use crate::diagnostic::ConfigError;
use crate::model::ReelwatchConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `session.ttl_hours` (one year).
pub const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &ReelwatchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.bot.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "bot.log_level `{}` must be one of {}",
            config.bot.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    for (field, url) in [
        ("tmdb.api_base_url", &config.tmdb.api_base_url),
        ("tmdb.image_base_url", &config.tmdb.image_base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{field} must be an http(s) URL, got `{url}`"
            )));
        }
    }

    let checker = &config.checker;
    if checker.worker_id.trim().is_empty() {
        errors.push(ConfigError::validation("checker.worker_id must not be empty"));
    }
    if checker.interval_hours == 0 {
        errors.push(ConfigError::validation(
            "checker.interval_hours must be at least 1",
        ));
    }
    if checker.workers == 0 {
        errors.push(ConfigError::validation("checker.workers must be at least 1"));
    }
    if checker.rate_per_sec == 0 {
        errors.push(ConfigError::validation(
            "checker.rate_per_sec must be at least 1",
        ));
    }
    if checker.fetch_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "checker.fetch_timeout_secs must be at least 1",
        ));
    }

    if config.session.ttl_hours == 0 {
        errors.push(ConfigError::validation("session.ttl_hours must be at least 1"));
    } else if config.session.ttl_hours > MAX_SESSION_TTL_HOURS {
        errors.push(ConfigError::validation(format!(
            "session.ttl_hours must be at most {MAX_SESSION_TTL_HOURS}, got {}",
            config.session.ttl_hours
        )));
    }

    let images = &config.images;
    if images.max_entries == 0 {
        errors.push(ConfigError::validation("images.max_entries must be at least 1"));
    }
    if images.max_width == 0 || images.max_height == 0 {
        errors.push(ConfigError::validation(format!(
            "images bounding box must be non-zero, got {}x{}",
            images.max_width, images.max_height
        )));
    }
    if !(1..=100).contains(&images.jpeg_quality) {
        errors.push(ConfigError::validation(format!(
            "images.jpeg_quality must be between 1 and 100, got {}",
            images.jpeg_quality
        )));
    }

    for user in &config.telegram.allowed_users {
        if user.trim().is_empty() {
            errors.push(ConfigError::validation(
                "telegram.allowed_users must not contain empty entries",
            ));
            break;
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
