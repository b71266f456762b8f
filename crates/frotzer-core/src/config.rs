//! Configuration types for Frotzer.
//!
//! [`FrotzerConfig`] is the complete configuration a session runs with. It
//! always carries a value for every field; only the game file may be unset,
//! which keeps the session idle. [`FrotzerOptions`] is the partial form used
//! to change it: every field is optional and set fields overwrite the current
//! value when merged.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::sequence::CommandSequences;
use crate::{Error, OutputFilter, Result};

/// Complete session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FrotzerConfig {
    /// Interpreter executable
    #[serde(alias = "dfexec")]
    pub executable: PathBuf,
    /// Arguments passed before the game file (`-m` disables MORE prompts)
    #[serde(alias = "dfopts")]
    pub args: Vec<String>,
    /// Game file, relative to `story_dir`. Required to start
    #[serde(alias = "gamefile")]
    pub game_file: Option<String>,
    /// Directory holding game files
    #[serde(alias = "gamedir")]
    pub story_dir: PathBuf,
    /// Directory holding save files
    #[serde(alias = "savedir")]
    pub save_dir: PathBuf,
    /// Filter applied to every response
    pub filter: OutputFilter,
    /// Command sequences for start, save, restore and quit
    #[serde(alias = "seq")]
    pub sequences: CommandSequences,
    /// Timeouts for waiting on the process
    pub timing: TimingSettings,
}

impl Default for FrotzerConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("./frotz/dfrotz"),
            args: vec!["-m".to_string()],
            game_file: None,
            story_dir: PathBuf::from("."),
            save_dir: PathBuf::from("./saves"),
            filter: OutputFilter::default(),
            sequences: CommandSequences::default(),
            timing: TimingSettings::default(),
        }
    }
}

impl FrotzerConfig {
    /// Load configuration from a YAML file, merged over the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options = FrotzerOptions::from_file(path)?;
        Self::default().merged(&options)
    }

    /// Parse configuration from a YAML string, merged over the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let options = FrotzerOptions::from_yaml(yaml)?;
        Self::default().merged(&options)
    }

    /// Whether every mandatory field is set.
    pub fn is_complete(&self) -> bool {
        self.game_file
            .as_deref()
            .is_some_and(|file| !file.trim().is_empty())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.executable.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "executable cannot be empty".to_string(),
            ));
        }

        if self.timing.response_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "timing.response_timeout_ms must be > 0".to_string(),
            ));
        }

        if self.timing.exit_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "timing.exit_timeout_ms must be > 0".to_string(),
            ));
        }

        self.sequences.validate()
    }

    /// Return a copy with `options` merged in, validated.
    ///
    /// `self` is left untouched, so a failed merge keeps the previous
    /// configuration.
    pub fn merged(&self, options: &FrotzerOptions) -> Result<Self> {
        let mut config = self.clone();
        options.merge_into(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Path of the game file, if one is configured.
    pub fn game_path(&self) -> Option<PathBuf> {
        self.game_file
            .as_deref()
            .filter(|file| !file.trim().is_empty())
            .map(|file| self.story_dir.join(file))
    }

    /// Resolve a save file name under the save directory.
    ///
    /// The name must be a relative path that stays inside the directory.
    pub fn save_path(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename);

        if filename.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "save file name cannot be empty".to_string(),
            ));
        }

        let escapes = name.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(Error::InvalidConfig(format!(
                "save file name '{filename}' must stay inside the save directory"
            )));
        }

        Ok(self.save_dir.join(name))
    }
}

/// Timeouts used while waiting on the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimingSettings {
    /// Maximum wait for the first output after a command (or after spawn)
    pub response_timeout_ms: u64,
    /// Extra time to keep collecting output once it started arriving
    pub drain_grace_ms: u64,
    /// Maximum wait for the process to exit on kill or quit
    pub exit_timeout_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            response_timeout_ms: 30_000,
            drain_grace_ms: 25,
            exit_timeout_ms: 5_000,
        }
    }
}

impl TimingSettings {
    /// Response timeout as a duration.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Drain grace period as a duration.
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }

    /// Exit timeout as a duration.
    pub fn exit_timeout(&self) -> Duration {
        Duration::from_millis(self.exit_timeout_ms)
    }
}

/// Partial configuration. Set fields overwrite, unset fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FrotzerOptions {
    /// Interpreter executable
    #[serde(alias = "dfexec", skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,
    /// Arguments passed before the game file
    #[serde(alias = "dfopts", skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Game file, relative to the story directory
    #[serde(alias = "gamefile", skip_serializing_if = "Option::is_none")]
    pub game_file: Option<String>,
    /// Directory holding game files
    #[serde(alias = "gamedir", skip_serializing_if = "Option::is_none")]
    pub story_dir: Option<PathBuf>,
    /// Directory holding save files
    #[serde(alias = "savedir", skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,
    /// Output filter: compact, oneline or none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<OutputFilter>,
    /// Command sequences
    #[serde(alias = "seq", skip_serializing_if = "Option::is_none")]
    pub sequences: Option<SequenceOptions>,
    /// Timeouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingOptions>,
}

impl FrotzerOptions {
    /// Options that only set the game file.
    pub fn with_game_file(game_file: impl Into<String>) -> Self {
        Self {
            game_file: Some(game_file.into()),
            ..Self::default()
        }
    }

    /// Load options from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse options from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Overwrite the fields of `config` that are set here.
    pub fn merge_into(&self, config: &mut FrotzerConfig) {
        if let Some(executable) = &self.executable {
            config.executable = executable.clone();
        }
        if let Some(args) = &self.args {
            config.args = args.clone();
        }
        if let Some(game_file) = &self.game_file {
            config.game_file = Some(game_file.clone());
        }
        if let Some(story_dir) = &self.story_dir {
            config.story_dir = story_dir.clone();
        }
        if let Some(save_dir) = &self.save_dir {
            config.save_dir = save_dir.clone();
        }
        if let Some(filter) = self.filter {
            config.filter = filter;
        }
        if let Some(sequences) = &self.sequences {
            sequences.merge_into(&mut config.sequences);
        }
        if let Some(timing) = &self.timing {
            timing.merge_into(&mut config.timing);
        }
    }
}

/// Partial command sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SequenceOptions {
    /// Quit commands; the last one is sent without waiting for a reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quit: Option<Vec<String>>,
    /// Entry appended to the responses of a quit
    #[serde(alias = "quit_endmarker", skip_serializing_if = "Option::is_none")]
    pub quit_end_marker: Option<String>,
    /// Save commands with one `@filename` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<Vec<String>>,
    /// Restore commands with one `@filename` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<Vec<String>>,
    /// Commands sent right after spawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Vec<String>>,
    /// Leading start entries to discard, counting the launch line as the first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_drop: Option<usize>,
}

impl SequenceOptions {
    fn merge_into(&self, sequences: &mut CommandSequences) {
        if let Some(quit) = &self.quit {
            sequences.quit = quit.clone();
        }
        if let Some(marker) = &self.quit_end_marker {
            sequences.quit_end_marker = marker.clone();
        }
        if let Some(save) = &self.save {
            sequences.save = save.clone();
        }
        if let Some(restore) = &self.restore {
            sequences.restore = restore.clone();
        }
        if let Some(start) = &self.start {
            sequences.start = start.clone();
        }
        if let Some(drop) = self.start_drop {
            sequences.start_drop = drop;
        }
    }
}

/// Partial timing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimingOptions {
    /// Maximum wait for the first output after a command
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_timeout_ms: Option<u64>,
    /// Extra time to keep collecting output once it started arriving
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain_grace_ms: Option<u64>,
    /// Maximum wait for the process to exit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_timeout_ms: Option<u64>,
}

impl TimingOptions {
    fn merge_into(&self, timing: &mut TimingSettings) {
        if let Some(ms) = self.response_timeout_ms {
            timing.response_timeout_ms = ms;
        }
        if let Some(ms) = self.drain_grace_ms {
            timing.drain_grace_ms = ms;
        }
        if let Some(ms) = self.exit_timeout_ms {
            timing.exit_timeout_ms = ms;
        }
    }
}
