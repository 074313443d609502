//! Loading configuration and preferences from disk.

use std::fs;

use rapid::{ConfigError, PersistentStore, UiConfig, open_store};
use tempfile::tempdir;

#[test]
fn toml_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rapid-ui.toml");
    fs::write(
        &path,
        "[sidebar]\nhover_throttle_ms = 100\ntoggle_keys = [\"`\"]\n\n[logging]\njson = true\n",
    )
    .unwrap();
    let config = UiConfig::from_toml_file(&path).unwrap();
    assert_eq!(config.sidebar.hover_throttle_ms, 100);
    assert_eq!(config.sidebar.toggle_keys, vec!["`".to_owned()]);
    assert!(config.logging.json);
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn json_file_is_validated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rapid-ui.json");
    fs::write(&path, r#"{"sidebar": {"min_width_px": 500, "default_width_px": 300}}"#).unwrap();
    let err = UiConfig::from_json_file(&path).unwrap_err();
    let ConfigError::Invalid(errors) = err else {
        panic!("expected validation failure, got {err}");
    };
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("default_width_px"));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = UiConfig::from_toml_file(dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn preferences_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    {
        let store = open_store(&path);
        store.set_item("inspector.width", "320").unwrap();
    }
    let store = open_store(&path);
    assert_eq!(store.get_item("inspector.width").as_deref(), Some("320"));
}

#[test]
fn corrupted_preferences_fall_back_to_memory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    fs::write(&path, "{ not json").unwrap();
    let store = open_store(&path);
    assert_eq!(store.get_item("inspector.width"), None);
    store.set_item("inspector.width", "300").unwrap();
    assert_eq!(store.get_item("inspector.width").as_deref(), Some("300"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}
