//! Line-oriented chat loop.

use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::commands::{process_input, CommandResult};
use crate::core::message::Message;
use crate::core::session::ConversationSession;
use crate::utils::logging::TranscriptLog;

pub async fn run_chat(
    mut session: ConversationSession,
    log_file: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut transcript = TranscriptLog::new(log_file)?;

    eprintln!(
        "🤖 Chatting with {} ({}) · /help for commands, /quit to leave",
        session.config().name,
        session.model()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    chat_loop(&mut session, &mut transcript, stdin, &mut stdout).await?;
    Ok(())
}

/// Reads lines until `/quit` or end of input. Only one message is ever in
/// flight: the next line is not read until the current send settles.
pub async fn chat_loop<R, W>(
    session: &mut ConversationSession,
    transcript: &mut TranscriptLog,
    input: R,
    output: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "You: ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(output)?;
            return Ok(());
        };

        match process_input(session, transcript, &line) {
            CommandResult::Quit => return Ok(()),
            CommandResult::Continue(notice) => {
                if let Some(notice) = notice {
                    writeln!(output, "{notice}")?;
                }
            }
            CommandResult::ProcessAsMessage(text) => {
                // The user turn enters history even if the call fails.
                if !text.trim().is_empty() {
                    log_turn(transcript, &Message::user(text.as_str()));
                }
                match session.send(&text).await {
                    Ok(reply) => {
                        writeln!(output, "{}: {reply}\n", session.config().name)?;
                        log_turn(transcript, &Message::assistant(reply));
                    }
                    Err(err) => writeln!(output, "⚠️  {err}")?,
                }
            }
        }
    }
}

pub(crate) fn log_turn(transcript: &TranscriptLog, message: &Message) {
    if let Err(err) = transcript.log_turn(message) {
        warn!("{err}");
    }
}
