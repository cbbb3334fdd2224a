//! # Uplink Command Selection
//!
//! Decides the outbound control command for each polling cycle from the
//! operator's command file. The file is a mailbox, not a queue: whatever it
//! holds at poll time is the command, it is re-read in full every cycle,
//! and the selector never truncates or rewrites it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GroundStationError, Result};
use crate::telemetry::protocol::{COMMAND_DELIMITER, SILENT_COMMAND, STOP_COMMAND};

/// The outbound decision for one polling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandDirective {
    /// End the session: close the transport and stop polling
    Terminate,

    /// Suppress outbound transmission this cycle but keep polling
    EnterSilent,

    /// Transmit the operator's literal command (delimiter included)
    SendLiteral(String),

    /// Transmit the session's configured default command
    SendDefault,
}

/// Selects the next uplink command from the command file.
///
/// The default command is normalized at construction to carry the trailing
/// delimiter the payload firmware requires.
#[derive(Debug, Clone)]
pub struct CommandSelector {
    path: PathBuf,
    default_command: String,
}

impl CommandSelector {
    /// Create a selector for the given command file.
    ///
    /// # Arguments
    ///
    /// * `path` - Command file re-read every cycle
    /// * `default_command` - Sent when the file holds nothing actionable;
    ///   the command delimiter is appended if missing
    pub fn new<P: AsRef<Path>>(path: P, default_command: &str) -> Self {
        let mut default_command = default_command.to_string();
        if !default_command.ends_with(COMMAND_DELIMITER) {
            default_command.push(COMMAND_DELIMITER);
        }
        Self {
            path: path.as_ref().to_path_buf(),
            default_command,
        }
    }

    /// Read the command file and select this cycle's directive.
    ///
    /// The first whitespace-delimited token decides:
    /// - the terminate keyword (exact, case-sensitive) ends the session
    /// - the silent keyword suppresses transmission for this cycle
    /// - a token ending in the command delimiter is sent literally
    /// - anything else (including an empty file) selects the default
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::FileUnavailable`] when the command
    /// file cannot be read; the caller treats that as frame-fatal but
    /// session-non-fatal.
    pub fn next_directive(&self) -> Result<CommandDirective> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| GroundStationError::FileUnavailable {
                path: self.path.display().to_string(),
                source: e,
            })?;
        let token = contents.split_whitespace().next().unwrap_or("");

        Ok(match token {
            STOP_COMMAND => CommandDirective::Terminate,
            SILENT_COMMAND => CommandDirective::EnterSilent,
            t if t.ends_with(COMMAND_DELIMITER) => CommandDirective::SendLiteral(t.to_string()),
            _ => CommandDirective::SendDefault,
        })
    }

    /// Bytes to transmit for a directive, or `None` when nothing is sent
    pub fn payload(&self, directive: &CommandDirective) -> Option<Vec<u8>> {
        match directive {
            CommandDirective::Terminate | CommandDirective::EnterSilent => None,
            CommandDirective::SendLiteral(cmd) => Some(cmd.clone().into_bytes()),
            CommandDirective::SendDefault => Some(self.default_command.clone().into_bytes()),
        }
    }

    /// The normalized default command text
    pub fn default_command(&self) -> &str {
        &self.default_command
    }
}
