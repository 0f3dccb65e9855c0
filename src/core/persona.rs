use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const MIN_MAX_TOKENS: u32 = 256;
pub const MAX_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Minimum number of characters in a persona name before the authoring flow
/// lets the user move on.
pub const MIN_NAME_CHARS: usize = 2;

const DEFAULT_NAME: &str = "Friendly Assistant";
const DEFAULT_TRAITS: &[&str] = &["Helpful", "Friendly"];
const DEFAULT_DOMAINS: &[&str] = &["General Knowledge"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Formal,
    Casual,
    #[default]
    Friendly,
}

impl ResponseStyle {
    pub const ALL: [ResponseStyle; 3] = [
        ResponseStyle::Formal,
        ResponseStyle::Casual,
        ResponseStyle::Friendly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStyle::Formal => "formal",
            ResponseStyle::Casual => "casual",
            ResponseStyle::Friendly => "friendly",
        }
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic avatar choice carried alongside the persona so front ends can
/// pick an icon. It has no effect on the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStyle {
    #[default]
    Default,
    Professional,
    Friendly,
    Technical,
}

impl AvatarStyle {
    pub const ALL: [AvatarStyle; 4] = [
        AvatarStyle::Default,
        AvatarStyle::Professional,
        AvatarStyle::Friendly,
        AvatarStyle::Technical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AvatarStyle::Default => "default",
            AvatarStyle::Professional => "professional",
            AvatarStyle::Friendly => "friendly",
            AvatarStyle::Technical => "technical",
        }
    }
}

impl fmt::Display for AvatarStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a persona fails schema validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersonaError {
    #[error("persona name must not be blank")]
    BlankName,

    #[error("persona name must be at least 2 characters")]
    NameTooShort,

    #[error("persona needs at least one personality trait")]
    NoTraits,

    #[error("persona needs at least one knowledge domain")]
    NoDomains,

    #[error("{field} labels must not be blank")]
    BlankLabel { field: &'static str },

    #[error("{field} label '{label}' appears more than once")]
    DuplicateLabel { field: &'static str, label: String },

    #[error("temperature {0} is outside 0.0..=1.0")]
    TemperatureOutOfRange(f64),

    #[error("max tokens {0} is outside 256..=2048")]
    MaxTokensOutOfRange(u32),
}

/// The identity the assistant presents, plus its sampling parameters.
///
/// The serialized field names follow the `botConfig` layout written by the
/// browser front end (`personality`, `domain`), with the descriptive names
/// accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaConfig {
    pub name: String,
    #[serde(default)]
    pub avatar: AvatarStyle,
    #[serde(rename = "personality", alias = "personalityTraits")]
    pub personality_traits: Vec<String>,
    #[serde(default)]
    pub response_style: ResponseStyle,
    #[serde(
        rename = "domain",
        alias = "knowledgeDomains",
        default = "default_domains"
    )]
    pub knowledge_domains: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(|s| s.to_string()).collect()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            avatar: AvatarStyle::default(),
            personality_traits: DEFAULT_TRAITS.iter().map(|s| s.to_string()).collect(),
            response_style: ResponseStyle::default(),
            knowledge_domains: default_domains(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl PersonaConfig {
    /// Blank starting point for the authoring flow: no name, traits or domains.
    pub fn empty_draft() -> Self {
        Self {
            name: String::new(),
            personality_traits: Vec::new(),
            knowledge_domains: Vec::new(),
            ..Self::default()
        }
    }

    /// Schema check applied on load, save and update. A persona that passes
    /// is also [complete](Self::is_complete).
    pub fn validate(&self) -> Result<(), PersonaError> {
        if self.name.trim().is_empty() {
            return Err(PersonaError::BlankName);
        }
        if !self.has_valid_name() {
            return Err(PersonaError::NameTooShort);
        }
        if self.personality_traits.is_empty() {
            return Err(PersonaError::NoTraits);
        }
        check_labels("personality trait", &self.personality_traits)?;
        if self.knowledge_domains.is_empty() {
            return Err(PersonaError::NoDomains);
        }
        check_labels("knowledge domain", &self.knowledge_domains)?;
        if !self.temperature.is_finite()
            || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature)
        {
            return Err(PersonaError::TemperatureOutOfRange(self.temperature));
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(PersonaError::MaxTokensOutOfRange(self.max_tokens));
        }
        Ok(())
    }

    pub fn has_valid_name(&self) -> bool {
        self.name.trim().chars().count() >= MIN_NAME_CHARS
    }

    /// Whether the authoring flow would accept this persona as finished.
    pub fn is_complete(&self) -> bool {
        self.has_valid_name()
            && !self.personality_traits.is_empty()
            && !self.knowledge_domains.is_empty()
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}, an AI assistant with the following personality: {}. \
             Respond to messages in a way that reflects this personality while being helpful and accurate.",
            self.name,
            self.personality_traits.join(", ")
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

fn check_labels(field: &'static str, labels: &[String]) -> Result<(), PersonaError> {
    for (index, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(PersonaError::BlankLabel { field });
        }
        if labels[..index].contains(label) {
            return Err(PersonaError::DuplicateLabel {
                field,
                label: label.clone(),
            });
        }
    }
    Ok(())
}

/// Partial update for a [`PersonaConfig`].
///
/// `None` leaves a field alone. Values that the browser front end treated as
/// falsy are ignored as well: a blank name, an empty label list, a
/// temperature of `0.0` and `max_tokens` of `0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonaUpdate {
    pub name: Option<String>,
    pub avatar: Option<AvatarStyle>,
    pub personality_traits: Option<Vec<String>>,
    pub response_style: Option<ResponseStyle>,
    pub knowledge_domains: Option<Vec<String>>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl PersonaUpdate {
    /// Returns a copy of `base` with the present, non-falsy fields applied.
    pub fn apply_to(&self, base: &PersonaConfig) -> PersonaConfig {
        let mut merged = base.clone();

        if let Some(name) = self.name.as_deref().map(str::trim) {
            if !name.is_empty() {
                merged.name = name.to_string();
            }
        }
        if let Some(avatar) = self.avatar {
            merged.avatar = avatar;
        }
        if let Some(traits) = &self.personality_traits {
            let traits = dedup_labels(traits);
            if !traits.is_empty() {
                merged.personality_traits = traits;
            }
        }
        if let Some(style) = self.response_style {
            merged.response_style = style;
        }
        if let Some(domains) = &self.knowledge_domains {
            let domains = dedup_labels(domains);
            if !domains.is_empty() {
                merged.knowledge_domains = domains;
            }
        }
        if let Some(temperature) = self.temperature {
            if temperature != 0.0 {
                merged.temperature = temperature;
            }
        }
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens != 0 {
                merged.max_tokens = max_tokens;
            }
        }

        merged
    }
}

/// Trims labels and drops blanks and repeats, keeping first-seen order.
pub fn dedup_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|existing| existing == label) {
            out.push(label.to_string());
        }
    }
    out
}
