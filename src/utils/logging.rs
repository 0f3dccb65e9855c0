//! Plain-text transcript of a chat run.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::core::message::{Message, Role};

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("No log file specified. Use /log <filename> to enable logging first.")]
    NoLogFile,

    #[error("Cannot write transcript to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct TranscriptLog {
    file_path: Option<PathBuf>,
    is_active: bool,
    user_label: String,
}

impl TranscriptLog {
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, TranscriptError> {
        let mut log = TranscriptLog {
            file_path: None,
            is_active: false,
            user_label: "You".to_string(),
        };
        if let Some(path) = log_file {
            log.set_log_file(path)?;
        }
        Ok(log)
    }

    /// Points the transcript at `path` and starts logging.
    pub fn set_log_file(&mut self, path: impl Into<PathBuf>) -> Result<String, TranscriptError> {
        let path = path.into();
        check_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;
        self.write_marker("Logging started")?;

        Ok(format!("Logging enabled to: {}", path.display()))
    }

    pub fn toggle_logging(&mut self) -> Result<String, TranscriptError> {
        let Some(path) = self.file_path.clone() else {
            return Err(TranscriptError::NoLogFile);
        };
        if self.is_active {
            self.write_marker("Logging paused")?;
            self.is_active = false;
            Ok(format!("Logging paused (file: {})", path.display()))
        } else {
            self.is_active = true;
            self.write_marker("Logging resumed")?;
            Ok(format!("Logging resumed to: {}", path.display()))
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn log_turn(&self, message: &Message) -> Result<(), TranscriptError> {
        match message.role {
            Role::User => self.log_text(&format!("{}: {}", self.user_label, message.content)),
            Role::Assistant => self.log_text(&message.content),
            Role::System => Ok(()),
        }
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }

    fn write_marker(&self, label: &str) -> Result<(), TranscriptError> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.log_text(&format!("## {label} {stamp}"))
    }

    fn log_text(&self, content: &str) -> Result<(), TranscriptError> {
        let Some(path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let io_err = |source: std::io::Error| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}").map_err(io_err)?;
        }
        writeln!(writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }
}

fn check_file_access(path: &Path) -> Result<(), TranscriptError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}
