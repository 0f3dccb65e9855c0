//! Step-by-step persona authoring.
//!
//! The wizard edits a draft [`PersonaConfig`] across three steps and only
//! hands it back once every step's gate passes.

use std::fmt;

use thiserror::Error;

use crate::core::persona::{
    AvatarStyle, PersonaConfig, ResponseStyle, MAX_MAX_TOKENS, MAX_TEMPERATURE, MIN_MAX_TOKENS,
    MIN_TEMPERATURE,
};

pub const PERSONALITY_TRAITS: &[&str] = &[
    "Friendly",
    "Professional",
    "Technical",
    "Creative",
    "Humorous",
    "Formal",
    "Casual",
    "Empathetic",
];

pub const KNOWLEDGE_DOMAINS: &[&str] = &[
    "General Knowledge",
    "Technical Support",
    "Customer Service",
    "Programming",
    "Science",
    "Business",
    "Education",
    "Healthcare",
];

pub const TEMPERATURE_STEP: f64 = 0.1;
pub const MAX_TOKENS_STEP: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    BasicInfo,
    Personality,
    Knowledge,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::BasicInfo,
        WizardStep::Personality,
        WizardStep::Knowledge,
    ];

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Info",
            WizardStep::Personality => "Personality",
            WizardStep::Knowledge => "Knowledge",
        }
    }

    pub fn index(self) -> usize {
        match self {
            WizardStep::BasicInfo => 0,
            WizardStep::Personality => 1,
            WizardStep::Knowledge => 2,
        }
    }

    fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn is_last(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{step} is incomplete: {reason}")]
    Incomplete {
        step: WizardStep,
        reason: &'static str,
    },

    #[error("finish is only available on the last step")]
    NotOnLastStep,
}

#[derive(Debug, Clone)]
pub struct PersonaWizard {
    draft: PersonaConfig,
    step: WizardStep,
}

impl Default for PersonaWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaWizard {
    pub fn new() -> Self {
        Self {
            draft: PersonaConfig::empty_draft(),
            step: WizardStep::BasicInfo,
        }
    }

    /// Starts from an existing persona so the user can tweak it.
    pub fn from_config(config: PersonaConfig) -> Self {
        Self {
            draft: config,
            step: WizardStep::BasicInfo,
        }
    }

    pub fn draft(&self) -> &PersonaConfig {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_avatar(&mut self, avatar: AvatarStyle) {
        self.draft.avatar = avatar;
    }

    /// Adds the trait if absent, removes it if present. Returns whether it is
    /// now selected.
    pub fn toggle_trait(&mut self, label: &str) -> bool {
        toggle_label(&mut self.draft.personality_traits, label)
    }

    pub fn set_response_style(&mut self, style: ResponseStyle) {
        self.draft.response_style = style;
    }

    pub fn toggle_domain(&mut self, label: &str) -> bool {
        toggle_label(&mut self.draft.knowledge_domains, label)
    }

    /// Clamps to the allowed range and snaps to the nearest 0.1.
    pub fn set_temperature(&mut self, value: f64) {
        let value = if value.is_finite() {
            value
        } else {
            MIN_TEMPERATURE
        };
        let clamped = value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let snapped = (clamped / TEMPERATURE_STEP).round() * TEMPERATURE_STEP;
        self.draft.temperature = (snapped * 10.0).round() / 10.0;
    }

    /// Clamps to the allowed range and snaps to the nearest multiple of 256.
    pub fn set_max_tokens(&mut self, value: u32) {
        let clamped = value.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
        let steps = (clamped + MAX_TOKENS_STEP / 2) / MAX_TOKENS_STEP;
        self.draft.max_tokens = steps * MAX_TOKENS_STEP;
    }

    fn check(&self, step: WizardStep) -> Result<(), WizardError> {
        let reason = match step {
            WizardStep::BasicInfo if !self.draft.has_valid_name() => {
                Some("name must be at least 2 characters")
            }
            WizardStep::Personality if self.draft.personality_traits.is_empty() => {
                Some("select at least one personality trait")
            }
            WizardStep::Knowledge if self.draft.knowledge_domains.is_empty() => {
                Some("select at least one knowledge domain")
            }
            _ => None,
        };
        match reason {
            Some(reason) => Err(WizardError::Incomplete { step, reason }),
            None => Ok(()),
        }
    }

    /// Whether the current step's requirements are met.
    pub fn can_advance(&self) -> bool {
        self.check(self.step).is_ok()
    }

    /// Moves to the next step when the current one is satisfied. On the last
    /// step this only validates.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.check(self.step)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Returns the finished persona. Every step is re-checked so a draft
    /// edited out of order cannot slip through.
    pub fn finish(&self) -> Result<PersonaConfig, WizardError> {
        if !self.step.is_last() {
            return Err(WizardError::NotOnLastStep);
        }
        for step in WizardStep::ALL {
            self.check(step)?;
        }
        let mut config = self.draft.clone();
        config.name = config.name.trim().to_string();
        Ok(config)
    }
}

fn toggle_label(labels: &mut Vec<String>, label: &str) -> bool {
    let label = label.trim();
    if let Some(position) = labels.iter().position(|existing| existing == label) {
        labels.remove(position);
        false
    } else if label.is_empty() {
        false
    } else {
        labels.push(label.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_wizard() -> PersonaWizard {
        let mut wizard = PersonaWizard::new();
        wizard.set_name("Ava");
        wizard.next().unwrap();
        wizard.toggle_trait("Friendly");
        wizard.set_response_style(ResponseStyle::Casual);
        wizard.next().unwrap();
        wizard.toggle_domain("Science");
        wizard
    }

    #[test]
    fn starts_on_basic_info_with_empty_draft() {
        let wizard = PersonaWizard::new();
        assert_eq!(wizard.step(), WizardStep::BasicInfo);
        assert!(wizard.draft().name.is_empty());
        assert!(!wizard.can_advance());
    }

    #[test]
    fn short_name_blocks_advancing() {
        let mut wizard = PersonaWizard::new();
        wizard.set_name("A");
        let err = wizard.next().unwrap_err();
        assert!(matches!(
            err,
            WizardError::Incomplete {
                step: WizardStep::BasicInfo,
                ..
            }
        ));
        assert_eq!(wizard.step(), WizardStep::BasicInfo);

        wizard.set_name("Al");
        assert_eq!(wizard.next().unwrap(), WizardStep::Personality);
    }

    #[test]
    fn personality_step_requires_a_trait() {
        let mut wizard = PersonaWizard::new();
        wizard.set_name("Ava");
        wizard.next().unwrap();
        assert!(!wizard.can_advance());

        assert!(wizard.toggle_trait("Creative"));
        assert!(wizard.can_advance());
        assert!(!wizard.toggle_trait("Creative"));
        assert!(!wizard.can_advance());
    }

    #[test]
    fn finish_returns_complete_persona() {
        let config = completed_wizard().finish().unwrap();
        assert!(config.is_complete());
        assert_eq!(config.name, "Ava");
        assert_eq!(config.personality_traits, vec!["Friendly"]);
        assert_eq!(config.knowledge_domains, vec!["Science"]);
        assert_eq!(config.response_style, ResponseStyle::Casual);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn finish_requires_last_step_and_domains() {
        let mut wizard = PersonaWizard::new();
        wizard.set_name("Ava");
        assert_eq!(wizard.finish(), Err(WizardError::NotOnLastStep));

        let mut wizard = completed_wizard();
        wizard.toggle_domain("Science");
        assert!(matches!(
            wizard.finish(),
            Err(WizardError::Incomplete {
                step: WizardStep::Knowledge,
                ..
            })
        ));
    }

    #[test]
    fn finish_rechecks_earlier_steps() {
        let mut wizard = completed_wizard();
        wizard.set_name("");
        assert!(matches!(
            wizard.finish(),
            Err(WizardError::Incomplete {
                step: WizardStep::BasicInfo,
                ..
            })
        ));
    }

    #[test]
    fn back_stops_at_first_step() {
        let mut wizard = completed_wizard();
        assert_eq!(wizard.back(), WizardStep::Personality);
        assert_eq!(wizard.back(), WizardStep::BasicInfo);
        assert_eq!(wizard.back(), WizardStep::BasicInfo);
    }

    #[test]
    fn sliders_clamp_and_snap() {
        let mut wizard = PersonaWizard::new();
        wizard.set_temperature(0.74);
        assert_eq!(wizard.draft().temperature, 0.7);
        wizard.set_temperature(3.0);
        assert_eq!(wizard.draft().temperature, 1.0);
        wizard.set_temperature(-1.0);
        assert_eq!(wizard.draft().temperature, 0.0);

        wizard.set_max_tokens(700);
        assert_eq!(wizard.draft().max_tokens, 768);
        wizard.set_max_tokens(10);
        assert_eq!(wizard.draft().max_tokens, 256);
        wizard.set_max_tokens(100_000);
        assert_eq!(wizard.draft().max_tokens, 2048);
    }

    #[test]
    fn from_config_seeds_draft() {
        let wizard = PersonaWizard::from_config(PersonaConfig::default());
        assert!(wizard.can_advance());
        assert_eq!(wizard.draft().name, "Friendly Assistant");
    }
}
