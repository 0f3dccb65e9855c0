//! One-shot "say" command

use std::error::Error;
use std::path::PathBuf;

use crate::cli::chat::log_turn;
use crate::core::message::Message;
use crate::core::session::ConversationSession;
use crate::utils::logging::TranscriptLog;

pub async fn run_say(
    mut session: ConversationSession,
    prompt: &str,
    log_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let transcript = TranscriptLog::new(log_file)?;

    log_turn(&transcript, &Message::user(prompt));
    match session.send(prompt).await {
        Ok(reply) => {
            println!("{reply}");
            log_turn(&transcript, &Message::assistant(reply));
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
    }
}
