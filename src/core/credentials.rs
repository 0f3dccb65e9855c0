use std::error::Error;
use std::fmt;

use crate::core::config::Settings;

/// The API key could not be found. Raised before any session exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError {
    variable: String,
}

impl CredentialError {
    pub fn missing(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn quick_fixes(&self) -> Vec<String> {
        vec![
            format!("export {}=...   # Set the key for this shell", self.variable),
            "personabot show   # Check which settings are in effect".to_string(),
            "api_key_env = \"MY_KEY\" in config.toml   # Read the key from another variable"
                .to_string(),
        ]
    }

    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "❌ Missing API key. Please set the {} environment variable.",
            self.variable
        )
    }
}

impl Error for CredentialError {}

/// Reads the API key from the variable named in `settings`.
pub fn resolve_credential(settings: &Settings) -> Result<String, CredentialError> {
    resolve_credential_from(settings, |key| std::env::var(key).ok())
}

pub fn resolve_credential_from<F>(settings: &Settings, lookup: F) -> Result<String, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(&settings.api_key_env)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CredentialError::missing(&settings.api_key_env))
}
