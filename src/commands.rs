//! Slash commands available inside `personabot chat`.

use crate::core::session::ConversationSession;
use crate::utils::logging::TranscriptLog;

pub const HELP_TEXT: &str = "Commands:\n  \
/clear            Forget the conversation so far\n  \
/history          Show the conversation so far\n  \
/persona          Show the active persona\n  \
/log <filename>   Enable logging to the given file\n  \
/log              Toggle logging pause/resume\n  \
/help             Show this help\n  \
/quit             Leave the chat";

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// The command was handled; print the notice, if any, and read the next line.
    Continue(Option<String>),
    ProcessAsMessage(String),
    Quit,
}

pub fn process_input(
    session: &mut ConversationSession,
    transcript: &mut TranscriptLog,
    input: &str,
) -> CommandResult {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "/quit" | "/exit" => CommandResult::Quit,
        "/help" => CommandResult::Continue(Some(HELP_TEXT.to_string())),
        "/clear" => {
            session.clear();
            CommandResult::Continue(Some("Conversation cleared.".to_string()))
        }
        "/history" => CommandResult::Continue(Some(render_history(session))),
        "/persona" => {
            let config = session.config();
            CommandResult::Continue(Some(format!(
                "{} ({} style) · traits: {} · domains: {} · temperature {} · max tokens {} · logging {}",
                config.name,
                config.response_style,
                config.personality_traits.join(", "),
                config.knowledge_domains.join(", "),
                config.temperature,
                config.max_tokens,
                transcript.get_status_string(),
            )))
        }
        "/log" => match args.as_slice() {
            [] => CommandResult::Continue(Some(
                transcript
                    .toggle_logging()
                    .unwrap_or_else(|e| format!("Error: {e}")),
            )),
            [filename] => CommandResult::Continue(Some(
                transcript
                    .set_log_file(*filename)
                    .unwrap_or_else(|e| format!("Error setting log file: {e}")),
            )),
            _ => CommandResult::Continue(Some(
                "Usage: /log [filename] - Enable logging to file, or /log to toggle pause/resume"
                    .to_string(),
            )),
        },
        other => CommandResult::Continue(Some(format!(
            "Unknown command: {other}. Type /help for a list."
        ))),
    }
}

fn render_history(session: &ConversationSession) -> String {
    let history = session.history();
    if history.is_empty() {
        return "(no messages yet)".to_string();
    }
    history
        .iter()
        .map(|message| format!("[{}] {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}
