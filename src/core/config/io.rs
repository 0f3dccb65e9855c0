use crate::core::config::data::{path_display, Settings};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

const SETTINGS_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.toml";

/// Errors that can occur when loading or saving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read config at {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config at {}: {source}", path_display(.path))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine a configuration directory for this platform")]
    NoConfigDir,
}

impl Settings {
    pub fn load_from_path(path: &Path) -> Result<Settings, SettingsError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        let contents = toml::to_string_pretty(self)?;
        write_atomically(path, contents.as_bytes())
    }

    /// Loads `config.toml` from the platform config directory and applies
    /// environment overrides.
    pub fn load() -> Result<Settings, SettingsError> {
        let path = settings_path()?;
        Ok(Settings::load_from_path(&path)?.with_env_overrides())
    }
}

pub fn config_dir() -> Result<PathBuf, SettingsError> {
    ProjectDirs::from("org", "personabot", "personabot")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(SettingsError::NoConfigDir)
}

pub fn settings_path() -> Result<PathBuf, SettingsError> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Location of the key-value document that holds the saved persona.
pub fn state_path() -> Result<PathBuf, SettingsError> {
    Ok(config_dir()?.join(STATE_FILE))
}

/// Writes `contents` to a temp file beside `path` and renames it into place.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), SettingsError> {
    let write_err = |source: std::io::Error| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let mut temp_file = match parent {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    }
    .map_err(write_err)?;

    temp_file.write_all(contents).map_err(write_err)?;
    temp_file.as_file_mut().sync_all().map_err(write_err)?;
    temp_file
        .persist(path)
        .map_err(|err| write_err(err.error))?;
    Ok(())
}
