//! Command sequences sent to the interpreter for start, save, restore and quit.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Placeholder replaced by the resolved save-file path.
pub const FILENAME_PLACEHOLDER: &str = "@filename";

/// Default string appended to the responses of a quit.
pub const DEFAULT_END_MARKER: &str = "<END>";

/// The command sequences a session sends on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CommandSequences {
    /// Commands that quit the game. The last one is sent without waiting for a reply
    pub quit: Vec<String>,
    /// Entry appended to the responses of a quit
    #[serde(alias = "quit_endmarker")]
    pub quit_end_marker: String,
    /// Commands that save the game; one entry contains `@filename`
    pub save: Vec<String>,
    /// Commands that restore the game; one entry contains `@filename`
    pub restore: Vec<String>,
    /// Commands sent right after the interpreter is spawned
    pub start: Vec<String>,
    /// Leading start entries to discard. The launch command line counts as
    /// the first one, so `1` keeps the opening output and every response
    pub start_drop: usize,
}

impl Default for CommandSequences {
    fn default() -> Self {
        Self {
            quit: vec!["quit".to_string(), "yes".to_string()],
            quit_end_marker: DEFAULT_END_MARKER.to_string(),
            save: vec!["save".to_string(), FILENAME_PLACEHOLDER.to_string()],
            restore: vec!["restore".to_string(), FILENAME_PLACEHOLDER.to_string()],
            start: vec![String::new()],
            start_drop: 1,
        }
    }
}

impl CommandSequences {
    /// Validate the sequences.
    pub fn validate(&self) -> Result<()> {
        if self.quit.is_empty() {
            return Err(Error::InvalidConfig(
                "sequences.quit must contain at least one command".to_string(),
            ));
        }

        for (name, sequence) in [("save", &self.save), ("restore", &self.restore)] {
            if !sequence.iter().any(|cmd| cmd.contains(FILENAME_PLACEHOLDER)) {
                return Err(Error::InvalidConfig(format!(
                    "sequences.{name} must contain an entry with '{FILENAME_PLACEHOLDER}'"
                )));
            }
        }

        Ok(())
    }

    /// Save sequence with `path` substituted for the placeholder.
    pub fn save_with(&self, path: &str) -> Result<Vec<String>> {
        substitute_filename(&self.save, path).ok_or_else(|| missing_placeholder("save"))
    }

    /// Restore sequence with `path` substituted for the placeholder.
    pub fn restore_with(&self, path: &str) -> Result<Vec<String>> {
        substitute_filename(&self.restore, path).ok_or_else(|| missing_placeholder("restore"))
    }

    /// Split the quit sequence into the commands that get a reply and the
    /// final command that is sent without waiting.
    pub fn quit_parts(&self) -> Result<(&[String], &str)> {
        self.quit
            .split_last()
            .map(|(last, replied)| (replied, last.as_str()))
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "sequences.quit must contain at least one command".to_string(),
                )
            })
    }
}

/// Replace the placeholder in the first entry that contains it.
///
/// Returns `None` when no entry contains the placeholder.
pub fn substitute_filename(sequence: &[String], filename: &str) -> Option<Vec<String>> {
    let index = sequence
        .iter()
        .position(|cmd| cmd.contains(FILENAME_PLACEHOLDER))?;

    let mut substituted = sequence.to_vec();
    substituted[index] = substituted[index].replacen(FILENAME_PLACEHOLDER, filename, 1);
    Some(substituted)
}

fn missing_placeholder(name: &str) -> Error {
    Error::InvalidConfig(format!(
        "sequences.{name} has no entry with '{FILENAME_PLACEHOLDER}'"
    ))
}
