use super::data::{Settings, DEFAULT_BASE_URL, DEFAULT_MODEL, MODEL_ENV, TIMEOUT_ENV};
use super::io::SettingsError;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_load_nonexistent_settings() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("nonexistent.toml");

    let settings = Settings::load_from_path(&path).expect("Failed to load settings");

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_settings_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("nested").join("config.toml");

    let settings = Settings {
        model: "llama-3.1-8b-instant".to_string(),
        request_timeout_secs: 15,
        ..Default::default()
    };
    settings.save_to_path(&path).expect("Failed to save settings");

    let loaded = Settings::load_from_path(&path).expect("Failed to load settings");
    assert_eq!(loaded, settings);
    assert_eq!(loaded.request_timeout(), Duration::from_secs(15));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "model = \"custom-model\"\n").unwrap();

    let loaded = Settings::load_from_path(&path).expect("Failed to load settings");
    assert_eq!(loaded.model, "custom-model");
    assert_eq!(loaded.base_url, DEFAULT_BASE_URL);
    assert_eq!(loaded.api_key_env, "GROQ_API_KEY");
}

#[test]
fn test_parse_error_names_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "model = [unclosed").unwrap();

    let err = Settings::load_from_path(&path).expect_err("expected parse failure");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn test_env_overrides_win_over_file() {
    let env = env_map(&[(MODEL_ENV, "override-model"), (TIMEOUT_ENV, "5")]);
    let settings = Settings::default().with_overrides_from(|key| env.get(key).cloned());

    assert_eq!(settings.model, "override-model");
    assert_eq!(settings.request_timeout_secs, 5);
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_invalid_timeout_override_is_ignored() {
    let env = env_map(&[(TIMEOUT_ENV, "soon"), (MODEL_ENV, "   ")]);
    let settings = Settings::default().with_overrides_from(|key| env.get(key).cloned());

    assert_eq!(settings, Settings::default());
}

#[test]
fn test_zero_timeout_in_file_uses_default() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "request_timeout_secs = 0\n").unwrap();

    let loaded = Settings::load_from_path(&path).expect("Failed to load settings");
    assert_eq!(loaded.request_timeout(), Duration::from_secs(60));

    let env = env_map(&[(TIMEOUT_ENV, "0")]);
    let overridden = loaded.with_overrides_from(|key| env.get(key).cloned());
    assert_eq!(overridden.request_timeout(), Duration::from_secs(60));
}
