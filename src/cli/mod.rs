//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments, sets up logging and the
//! runtime, and dispatches to the chat loop or one of the persona commands.

pub mod chat;
pub mod configure;
pub mod say;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::chat::run_chat;
use crate::cli::configure::run_configure;
use crate::cli::say::run_say;
use crate::core::config::io::settings_path;
use crate::core::config::Settings;
use crate::core::credentials::{resolve_credential, CredentialError};
use crate::core::persona::PersonaConfig;
use crate::core::session::ConversationSession;
use crate::core::store::{clear_persona, load_persona, FileStore};

#[derive(Parser)]
#[command(name = "personabot")]
#[command(about = "A terminal chat client that answers through a configurable persona")]
#[command(
    long_about = "Personabot talks to an OpenAI-compatible chat completion API while \
speaking as a persona you design: a name, personality traits, knowledge domains, \
a response style and sampling settings.\n\n\
Environment Variables:\n\
  GROQ_API_KEY              API key (the variable name can be changed in config.toml)\n\
  PERSONABOT_MODEL          Override the model id\n\
  PERSONABOT_BASE_URL       Override the API base URL\n\
  PERSONABOT_TIMEOUT_SECS   Override the request timeout\n\
  RUST_LOG                  Diagnostic log filter (default: warn)\n\n\
Commands inside chat:\n\
  /clear            Forget the conversation so far\n\
  /history          Show the conversation so far\n\
  /persona          Show the active persona\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for this run, overriding config.toml
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat loop (default)
    Chat,
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Design or edit the persona with a step-by-step wizard
    Configure,
    /// Print the settings in effect and the stored persona
    Show,
    /// Forget the stored persona and fall back to the default
    Reset,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

/// Diagnostics go to stderr so they never mix with chat output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let session = open_session(args.model)?;
            run_chat(session, args.log).await
        }
        Commands::Say { prompt } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                eprintln!("Usage: personabot say <prompt>");
                std::process::exit(1);
            }
            let session = open_session(args.model)?;
            run_say(session, &prompt, args.log).await
        }
        Commands::Configure => run_configure(),
        Commands::Show => {
            let settings = Settings::load()?;
            settings.print_all(&settings_path()?);

            let store = FileStore::open_default()?;
            let persona = load_persona(&store);
            println!("Persona ({}):", store.path().display());
            println!("{}", persona.to_json()?);
            Ok(())
        }
        Commands::Reset => {
            let mut store = FileStore::open_default()?;
            clear_persona(&mut store)?;
            println!(
                "✅ Persona reset; '{}' will be used until you run `personabot configure`",
                PersonaConfig::default().name
            );
            Ok(())
        }
    }
}

/// Loads settings, the stored persona and the credential, and builds a
/// session. A missing credential ends the process with its own exit code.
fn open_session(model: Option<String>) -> Result<ConversationSession, Box<dyn Error>> {
    let settings = Settings::load()?;

    let credential = match resolve_credential(&settings) {
        Ok(credential) => credential,
        Err(err) => report_credential_error(&err),
    };

    let store = FileStore::open_default()?;
    let persona = load_persona(&store);
    let session = ConversationSession::new(persona, &credential, &settings)?;
    Ok(match model.filter(|m| !m.trim().is_empty()) {
        Some(model) => session.with_model(model.trim()),
        None => session,
    })
}

fn report_credential_error(err: &CredentialError) -> ! {
    eprintln!("{err}");
    let fixes = err.quick_fixes();
    if !fixes.is_empty() {
        eprintln!();
        eprintln!("💡 Quick fixes:");
        for fix in fixes {
            eprintln!("  • {fix}");
        }
    }
    std::process::exit(err.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_chat() {
        let args = Args::try_parse_from(["personabot"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.model.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn say_joins_trailing_words() {
        let args =
            Args::try_parse_from(["personabot", "say", "--model", "m1", "hello", "-there"]).unwrap();
        assert_eq!(args.model.as_deref(), Some("m1"));
        match args.command {
            Some(Commands::Say { prompt }) => assert_eq!(prompt.join(" "), "hello -there"),
            _ => panic!("expected say"),
        }
    }

    #[test]
    fn global_log_flag_is_accepted_after_subcommand() {
        let args = Args::try_parse_from(["personabot", "chat", "--log", "chat.log"]).unwrap();
        assert!(matches!(args.command, Some(Commands::Chat)));
        assert_eq!(args.log, Some(PathBuf::from("chat.log")));
    }

    #[test]
    fn persona_commands_parse() {
        let parse = |word: &str| Args::try_parse_from(["personabot", word]).unwrap().command;
        assert!(matches!(parse("configure"), Some(Commands::Configure)));
        assert!(matches!(parse("show"), Some(Commands::Show)));
        assert!(matches!(parse("reset"), Some(Commands::Reset)));
        assert!(Args::try_parse_from(["personabot", "dance"]).is_err());
    }
}
