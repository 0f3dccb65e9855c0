//! Conversation state for one persona.
//!
//! A [`ConversationSession`] owns the turn history and the persona it speaks
//! as. Each [`send`](ConversationSession::send) records the user turn,
//! prepends a freshly synthesized system prompt, calls the completion
//! backend, and records the reply. The system prompt is never stored in the
//! history.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error};

use crate::api::{ChatMessage, ChatRequest};
use crate::core::completion::{CompletionBackend, CompletionError, HttpCompletionClient};
use crate::core::config::Settings;
use crate::core::message::Message;
use crate::core::persona::{PersonaConfig, PersonaUpdate};

/// Assistant text recorded when the provider returns no usable choice.
pub const NO_RESPONSE_FALLBACK: &str = "No response generated";
pub const TOP_P: f64 = 1.0;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Configuration(String),

    #[error("Message must not be empty")]
    Validation,

    #[error("Failed to generate response")]
    Generation,
}

pub struct ConversationSession {
    config: PersonaConfig,
    history: Vec<Message>,
    backend: Arc<dyn CompletionBackend>,
    model: String,
    request_timeout: Duration,
}

impl ConversationSession {
    /// Creates a session that talks to the endpoint described by `settings`.
    pub fn new(
        config: PersonaConfig,
        credential: &str,
        settings: &Settings,
    ) -> Result<Self, SessionError> {
        let credential = require_credential(credential)?;
        let backend = HttpCompletionClient::new(settings.base_url.clone(), credential);
        let mut session = Self::with_backend(config, credential, Arc::new(backend))?;
        session.model = settings.model.clone();
        session.request_timeout = settings.request_timeout();
        Ok(session)
    }

    /// Creates a session over an arbitrary backend, using default settings
    /// for the model id and timeout.
    pub fn with_backend(
        config: PersonaConfig,
        credential: &str,
        backend: Arc<dyn CompletionBackend>,
    ) -> Result<Self, SessionError> {
        require_credential(credential)?;
        config
            .validate()
            .map_err(|err| SessionError::Configuration(err.to_string()))?;

        let defaults = Settings::default();
        Ok(Self {
            config,
            history: Vec::new(),
            backend,
            model: defaults.model.clone(),
            request_timeout: defaults.request_timeout(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> String {
        self.config.system_prompt()
    }

    /// Snapshot of the turns so far; changing it does not affect the session.
    pub fn history(&self) -> Vec<Message> {
        self.history.clone()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Merges `update` into the persona. The merged persona must still pass
    /// validation, otherwise nothing changes.
    pub fn update_config(&mut self, update: PersonaUpdate) -> Result<(), SessionError> {
        let merged = update.apply_to(&self.config);
        merged
            .validate()
            .map_err(|err| SessionError::Configuration(err.to_string()))?;
        self.config = merged;
        Ok(())
    }

    /// Sends one user turn and returns the assistant reply.
    ///
    /// On a failed call the user turn stays in the history with no reply.
    pub async fn send(&mut self, text: &str) -> Result<String, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::Validation);
        }

        self.history.push(Message::user(text));
        let request = self.build_request();

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.request_timeout, self.backend.complete(&request))
            .await
            .unwrap_or_else(|_| {
                Err(CompletionError::Other(format!(
                    "timed out after {:?}",
                    self.request_timeout
                )))
            });

        match outcome {
            Ok(response) => {
                let reply = response
                    .first_content()
                    .filter(|content| !content.is_empty())
                    .unwrap_or(NO_RESPONSE_FALLBACK)
                    .to_string();
                debug!(
                    model = %self.model,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    chars = reply.chars().count(),
                    "completion received"
                );
                self.history.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                error!(model = %self.model, "Error in chat session: {err}");
                Err(SessionError::Generation)
            }
        }
    }

    fn build_request(&self) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::from(&Message::system(self.system_prompt())));
        messages.extend(self.history.iter().map(ChatMessage::from));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: TOP_P,
            stream: false,
            stop: None,
        }
    }
}

fn require_credential(credential: &str) -> Result<&str, SessionError> {
    let trimmed = credential.trim();
    if trimmed.is_empty() {
        return Err(SessionError::Configuration(
            "API key is required to initialize the chat session".to_string(),
        ));
    }
    Ok(trimmed)
}
