// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the reelwatch bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level reelwatch configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReelwatchConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// TMDB metadata provider settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Background TV show checker settings.
    #[serde(default)]
    pub checker: CheckerConfig,

    /// Interactive session cache settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Poster image cache settings.
    #[serde(default)]
    pub images: ImageConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name used in greetings and log lines.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "reelwatch".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Telegram user IDs or usernames allowed to talk to the bot.
    /// Empty means everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

/// TMDB API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TmdbConfig {
    /// Base URL of the TMDB v3 API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL poster paths are appended to.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_tmdb_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            timeout_secs: default_tmdb_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_tmdb_timeout_secs() -> u64 {
    15
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("reelwatch").join("reelwatch.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "reelwatch.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Background TV show checker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckerConfig {
    /// Run the checker as part of `serve`.
    #[serde(default = "default_checker_enabled")]
    pub enabled: bool,

    /// Durable identity of the worker row in `worker_states`.
    #[serde(default = "default_worker_id")]
    pub worker_id: String,

    /// Hours between cycles.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Number of concurrent show workers per cycle.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Steady provider request rate (requests per second).
    #[serde(default = "default_rate_per_sec")]
    pub rate_per_sec: u32,

    /// Token bucket capacity. 0 means "same as `rate_per_sec`".
    #[serde(default)]
    pub burst: u32,

    /// Upper bound on the fetch phase of a single cycle, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            enabled: default_checker_enabled(),
            worker_id: default_worker_id(),
            interval_hours: default_interval_hours(),
            workers: default_workers(),
            rate_per_sec: default_rate_per_sec(),
            burst: 0,
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl CheckerConfig {
    /// Effective bucket capacity.
    pub fn effective_burst(&self) -> u32 {
        if self.burst == 0 {
            self.rate_per_sec
        } else {
            self.burst
        }
    }
}

fn default_checker_enabled() -> bool {
    true
}

fn default_worker_id() -> String {
    "tv_show_checker".to_string()
}

fn default_interval_hours() -> u64 {
    24
}

fn default_workers() -> usize {
    5
}

fn default_rate_per_sec() -> u32 {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    600
}

/// Session cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sliding validity window of a session record, in hours.
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

fn default_session_ttl_hours() -> u64 {
    24
}

/// Poster image cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Maximum number of cached posters.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Bounding box width posters are shrunk into.
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Bounding box height posters are shrunk into.
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// JPEG re-encode quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Upstream download timeout in seconds.
    #[serde(default = "default_image_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            jpeg_quality: default_jpeg_quality(),
            fetch_timeout_secs: default_image_timeout_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    50
}

fn default_max_width() -> u32 {
    500
}

fn default_max_height() -> u32 {
    750
}

fn default_jpeg_quality() -> u8 {
    85
}

fn default_image_timeout_secs() -> u64 {
    10
}
