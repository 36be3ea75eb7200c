// SPDX-FileCopyrightText: 2026 Reelwatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the reelwatch configuration system.

use reelwatch_config::diagnostic::ConfigError;
use reelwatch_config::model::ReelwatchConfig;
use reelwatch_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[bot]
name = "movienight"
log_level = "debug"

[telegram]
bot_token = "123:ABC"
allowed_users = ["1001", "alice"]

[tmdb]
api_base_url = "http://localhost:9000/3"
image_base_url = "http://localhost:9000/img"
timeout_secs = 5

[storage]
database_path = "/tmp/reelwatch-test.db"
wal_mode = false

[checker]
enabled = false
worker_id = "checker-a"
interval_hours = 6
workers = 3
rate_per_sec = 4
burst = 8
fetch_timeout_secs = 120

[session]
ttl_hours = 12

[images]
max_entries = 10
max_width = 320
max_height = 480
jpeg_quality = 70
fetch_timeout_secs = 3
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.name, "movienight");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_users, vec!["1001", "alice"]);
    assert_eq!(config.tmdb.timeout_secs, 5);
    assert_eq!(config.storage.database_path, "/tmp/reelwatch-test.db");
    assert!(!config.storage.wal_mode);
    assert!(!config.checker.enabled);
    assert_eq!(config.checker.worker_id, "checker-a");
    assert_eq!(config.checker.interval_hours, 6);
    assert_eq!(config.checker.workers, 3);
    assert_eq!(config.checker.effective_burst(), 8);
    assert_eq!(config.session.ttl_hours, 12);
    assert_eq!(config.images.max_entries, 10);
    assert_eq!(config.images.jpeg_quality, 70);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.name, "reelwatch");
    assert_eq!(config.bot.log_level, "info");
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_users.is_empty());
    assert_eq!(config.tmdb.api_base_url, "https://api.themoviedb.org/3");
    assert!(config.storage.wal_mode);
    assert!(config.checker.enabled);
    assert_eq!(config.checker.worker_id, "tv_show_checker");
    assert_eq!(config.checker.interval_hours, 24);
    assert_eq!(config.checker.workers, 5);
    assert_eq!(config.checker.burst, 0);
    assert_eq!(config.checker.effective_burst(), config.checker.rate_per_sec);
    assert_eq!(config.session.ttl_hours, 24);
    assert_eq!(config.images.max_entries, 50);
}

/// Unknown field in [checker] is rejected with a suggestion.
#[test]
fn unknown_field_suggests_correction() {
    let toml = r#"
[checker]
intervl_hours = 2
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "intervl_hours" && suggestion.as_deref() == Some("interval_hours")
        )
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_produces_error() {
    let err = load_config_from_str("[scheduler]\nenabled = true\n")
        .expect_err("should reject unknown section");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("scheduler"),
        "error should mention the unknown section, got: {err_str}"
    );
}

/// A string where a number is expected is an InvalidType diagnostic.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[checker]\nworkers = \"five\"\n")
        .expect_err("should reject wrong type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("workers"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_through_load() {
    let errors = load_and_validate_str("[images]\njpeg_quality = 0\n")
        .expect_err("quality 0 must fail validation");
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("jpeg_quality")));
}

/// Dotted overrides (what the env provider produces) replace TOML values.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: ReelwatchConfig = Figment::new()
        .merge(Serialized::defaults(ReelwatchConfig::default()))
        .merge(Toml::string("[telegram]\nbot_token = \"from-toml\"\n"))
        .merge(("telegram.bot_token", "from-env"))
        .merge(("checker.interval_hours", 2))
        .extract()
        .expect("should merge override");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
    assert_eq!(config.checker.interval_hours, 2);
}

/// Loading from an explicit file path works and validates.
#[test]
fn load_from_file_path() {
    let dir = std::env::temp_dir().join(format!("reelwatch-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("reelwatch.toml");
    std::fs::write(&path, "[session]\nttl_hours = 48\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config should load");
    assert_eq!(config.session.ttl_hours, 48);

    std::fs::remove_dir_all(&dir).ok();
}

/// Diagnostics render through miette without panicking.
#[test]
fn diagnostics_render() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[bot]\nnaem = \"x\"\n").unwrap_err();
    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &errors[0] as &dyn Diagnostic)
        .expect("render");
    assert!(buf.contains("naem"));
}
