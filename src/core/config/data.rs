use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "llama-3.2-90b-vision-preview";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const MODEL_ENV: &str = "PERSONABOT_MODEL";
pub const BASE_URL_ENV: &str = "PERSONABOT_BASE_URL";
pub const TIMEOUT_ENV: &str = "PERSONABOT_TIMEOUT_SECS";

/// Client settings read from `config.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Model identifier sent with every completion request
    pub model: String,
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    pub base_url: String,
    /// Upper bound on a single completion call, in seconds
    pub request_timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl Settings {
    /// Zero is rejected the same way as a bad `PERSONABOT_TIMEOUT_SECS`:
    /// warn and use the default.
    pub fn request_timeout(&self) -> Duration {
        if self.request_timeout_secs == 0 {
            warn!(
                "Ignoring request_timeout_secs = 0: expected a positive number of seconds; using {}",
                DEFAULT_REQUEST_TIMEOUT_SECS
            );
            return Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS);
        }
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies `PERSONABOT_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!("Ignoring {TIMEOUT_ENV}={raw:?}: expected a positive number of seconds"),
            }
        }
        self
    }

    pub fn print_all(&self, path: &Path) {
        println!("Settings ({}):", path_display(path));
        println!("  model: {}", self.model);
        println!("  base-url: {}", self.base_url);
        println!("  request-timeout-secs: {}", self.request_timeout_secs);
        println!("  api-key-env: {}", self.api_key_env);
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
