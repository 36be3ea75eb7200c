// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order: `./reelwatch.toml` > `~/.config/reelwatch/reelwatch.toml` >
//! `/etc/reelwatch/reelwatch.toml`, with `REELWATCH_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReelwatchConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/reelwatch/reelwatch.toml";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "reelwatch.toml";

/// Sections recognised in `REELWATCH_<SECTION>_<KEY>` variables.
const ENV_SECTIONS: &[&str] = &[
    "bot", "telegram", "tmdb", "storage", "checker", "session", "images",
];

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reelwatch").join(LOCAL_CONFIG_FILE))
}

/// Build the full layered Figment.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/reelwatch/reelwatch.toml`
/// 3. `~/.config/reelwatch/reelwatch.toml`
/// 4. `./reelwatch.toml`
/// 5. `REELWATCH_*` environment variables
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ReelwatchConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy.
pub fn load_config() -> Result<ReelwatchConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<ReelwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelwatchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReelwatchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelwatchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `REELWATCH_TELEGRAM_BOT_TOKEN` into
/// `telegram.bot.token`; only the first underscore after the section name
/// becomes a dot here.
fn env_provider() -> Env {
    Env::prefixed("REELWATCH_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env key onto its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("checker_fetch_timeout_secs"), "checker.fetch_timeout_secs");
        assert_eq!(map_env_key("images_max_entries"), "images.max_entries");
        assert_eq!(map_env_key("unknown_thing"), "unknown_thing");
    }
}
