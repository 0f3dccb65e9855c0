//! Personabot is a terminal chat client that answers through a user-designed
//! persona, backed by a hosted OpenAI-compatible completion API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the persona model, the step-by-step wizard, persistence,
//!   settings, credential lookup, and the conversation session.
//! - [`api`] defines the chat completion payloads sent to the provider.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`utils`] holds URL helpers and the optional transcript log.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`], which
//! parses arguments and dispatches into the chat loop or a persona command.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod utils;
