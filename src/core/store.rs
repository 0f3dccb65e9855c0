//! Key-value persistence for the saved persona.
//!
//! Values are JSON text keyed by name, the same shape as browser local
//! storage. [`FileStore`] keeps the pairs in a small TOML document;
//! [`MemoryStore`] keeps them in a map.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::io::write_atomically;
use crate::core::config::SettingsError;
use crate::core::persona::{PersonaConfig, PersonaError};

/// Key under which the persona JSON is stored.
pub const BOT_CONFIG_KEY: &str = "botConfig";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    File(#[from] SettingsError),

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store. Every operation re-reads the file so edits made by
/// another process are picked up; writes replace the file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location in the platform config directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(crate::core::config::io::state_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        let entries = toml::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let contents = toml::to_string_pretty(entries)?;
        write_atomically(&self.path, contents.as_bytes())?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// Why a stored persona could not be used.
#[derive(Debug, Error)]
pub enum PersonaStoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Stored persona is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored persona is invalid: {0}")]
    Invalid(#[from] PersonaError),
}

/// Reads the persona under [`BOT_CONFIG_KEY`]. `Ok(None)` means nothing is
/// stored.
pub fn try_load_persona(
    store: &dyn KeyValueStore,
) -> Result<Option<PersonaConfig>, PersonaStoreError> {
    let Some(text) = store.get(BOT_CONFIG_KEY)? else {
        return Ok(None);
    };
    let config = PersonaConfig::from_json(&text)?;
    config.validate()?;
    Ok(Some(config))
}

/// Reads the stored persona, falling back to [`PersonaConfig::default`] when
/// nothing is stored or the stored value is unusable.
pub fn load_persona(store: &dyn KeyValueStore) -> PersonaConfig {
    match try_load_persona(store) {
        Ok(Some(config)) => config,
        Ok(None) => {
            debug!("No stored persona; using default");
            PersonaConfig::default()
        }
        Err(err) => {
            warn!("Ignoring stored persona: {err}");
            PersonaConfig::default()
        }
    }
}

pub fn save_persona(
    store: &mut dyn KeyValueStore,
    config: &PersonaConfig,
) -> Result<(), PersonaStoreError> {
    config.validate()?;
    store.set(BOT_CONFIG_KEY, config.to_json()?)?;
    Ok(())
}

pub fn clear_persona(store: &mut dyn KeyValueStore) -> Result<(), PersonaStoreError> {
    store.remove(BOT_CONFIG_KEY)?;
    Ok(())
}
