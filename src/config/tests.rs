//! Configuration tests
//!
//! The template written by `to_toml` must parse back into the same config,
//! otherwise first-run users get a broken file.

use super::*;

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
    assert_eq!(Config::from_file_config(parsed.unwrap()), config);
}

#[test]
fn test_config_roundtrip_custom_values() {
    let mut config = Config::default();
    config.timing.notification_duration_ms = 2500;
    config.layout.back_to_top_threshold = 320.5;
    config.logging.file_rotation = LogRotation::Never;
    config.storage.path = PathBuf::from("/tmp/folio/store.json");

    let parsed: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    assert_eq!(Config::from_file_config(parsed), config);
}

// ─────────────────────────────────────────────────────────────────────────────
// Partial files and defaults
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_partial_file_uses_defaults() {
    let parsed: FileConfig = toml::from_str(
        r#"
[timing]
scroll_debounce_ms = 25

[layout]
nav_offset = 64.0
"#,
    )
    .unwrap();
    let config = Config::from_file_config(parsed);

    assert_eq!(config.timing.scroll_debounce_ms, 25);
    assert_eq!(config.timing.notification_duration_ms, 5000);
    assert_eq!(config.layout.nav_offset, 64.0);
    assert_eq!(config.layout.section_preamble, 100.0);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_values_fall_back() {
    let parsed: FileConfig = toml::from_str(
        r#"
[timing]
counter_steps = 0

[layout]
observer_threshold = 3.0
viewport_width = -10.0
"#,
    )
    .unwrap();
    let config = Config::from_file_config(parsed);

    assert_eq!(config.timing.counter_steps, 30);
    assert_eq!(config.layout.observer_threshold, 1.0);
    assert_eq!(config.layout.viewport_width, 1280.0);
}

#[test]
fn test_load_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[timing\nbroken").unwrap();

    let err = Config::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}

#[test]
fn test_load_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.timing, Timing::default());
}

// ─────────────────────────────────────────────────────────────────────────────
// Environment overrides
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides() {
    let mut config = Config::default();
    config.apply_env(|key| match key {
        "FOLIO_STORAGE" => Some("/data/store.json".to_string()),
        "FOLIO_VIEWPORT" => Some("375x667".to_string()),
        "FOLIO_LOG_LEVEL" => Some("debug".to_string()),
        _ => None,
    });

    assert_eq!(config.storage.path, PathBuf::from("/data/store.json"));
    assert_eq!(config.layout.viewport_width, 375.0);
    assert_eq!(config.layout.viewport_height, 667.0);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_bad_viewport_env_is_ignored() {
    let mut config = Config::default();
    config.apply_env(|key| (key == "FOLIO_VIEWPORT").then(|| "wide".to_string()));
    assert_eq!(config.layout.viewport_width, 1280.0);
}

#[test]
fn test_parse_viewport_size() {
    assert_eq!(parse_viewport_size("1280x800"), Some((1280.0, 800.0)));
    assert_eq!(parse_viewport_size(" 390 X 844 "), Some((390.0, 844.0)));
    assert_eq!(parse_viewport_size("0x800"), None);
    assert_eq!(parse_viewport_size("1280"), None);
}
