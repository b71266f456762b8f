//! Interpreter session.

use std::path::Path;

use tracing::{debug, error, info, warn};

use frotzer_core::{Error, FrotzerConfig, FrotzerOptions, Result, SessionState};
use frotzer_process::ProcessHandle;

use crate::correlator::Correlator;

/// One managed lifecycle of the interpreter.
///
/// The state is derived on demand: `running` while a process is held,
/// otherwise `ready` when the configuration names a game file, otherwise
/// `idle`. Every process-facing operation takes `&mut self`, so calls on one
/// session never overlap.
#[derive(Debug, Default)]
pub struct Session {
    /// Current configuration
    config: FrotzerConfig,

    /// Interpreter process (Some iff running)
    process: Option<ProcessHandle>,
}

impl Session {
    /// Create a session with `config`.
    pub fn new(config: FrotzerConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    /// Create a session with `options` merged over the defaults.
    pub fn with_options(options: &FrotzerOptions) -> Result<Self> {
        Ok(Self::new(FrotzerConfig::default().merged(options)?))
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        SessionState::derive(self.process.is_some(), self.config.is_complete())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &FrotzerConfig {
        &self.config
    }

    /// Get the interpreter's process id, if running.
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(ProcessHandle::pid)
    }

    /// Merge `options` into the configuration.
    ///
    /// Not allowed while running. On validation failure the previous
    /// configuration is kept.
    pub fn init(&mut self, options: &FrotzerOptions) -> Result<SessionState> {
        self.require_stopped("init")?;

        self.config = self.config.merged(options).map_err(|e| {
            error!("Rejected configuration: {}", e);
            e
        })?;

        let state = self.state();
        info!("Session configured: state={}", state);
        Ok(state)
    }

    /// Spawn the interpreter and run the start sequence.
    ///
    /// Returns the opening output followed by one response per start command,
    /// less the first `start_drop - 1` entries.
    pub async fn start(&mut self) -> Result<Vec<String>> {
        self.require("start", SessionState::Ready)?;

        let game_path = self
            .config
            .game_path()
            .ok_or_else(|| Error::invalid_state("start", self.state(), SessionState::Ready))?;
        if !game_path.is_file() {
            error!("Game file not found: {}", game_path.display());
            return Err(Error::NotFound {
                operation: "start",
                path: game_path,
            });
        }

        let mut args = self.config.args.clone();
        args.push(game_path.to_string_lossy().into_owned());

        let process = ProcessHandle::spawn(&self.config.executable, &args)?;
        self.process = Some(process);
        info!("Session running: game='{}'", game_path.display());

        match self.run_start_sequence().await {
            Ok(responses) => Ok(responses),
            Err(e) => {
                error!("Start failed, stopping interpreter: {}", e);
                self.release().await;
                Err(e)
            }
        }
    }

    /// Merge `options` into the configuration, then start.
    ///
    /// If the start fails, the previous configuration is restored.
    pub async fn start_with(&mut self, options: &FrotzerOptions) -> Result<Vec<String>> {
        self.require_stopped("start")?;

        let previous = self.config.clone();
        self.init(options)?;

        match self.start().await {
            Ok(responses) => Ok(responses),
            Err(e) => {
                debug!("Rolling back configuration after failed start");
                self.config = previous;
                Err(e)
            }
        }
    }

    /// Send every command in order and return one response per command.
    pub async fn command<I, S>(&mut self, commands: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require("command", SessionState::Running)?;
        let commands: Vec<String> = commands
            .into_iter()
            .map(|command| command.as_ref().to_string())
            .collect();
        self.correlate(&commands).await
    }

    /// Send one command and return its response.
    pub async fn command_one(&mut self, command: &str) -> Result<String> {
        let mut responses = self.command([command]).await?;
        Ok(responses.pop().unwrap_or_default())
    }

    /// Write raw text to the interpreter without a line terminator.
    ///
    /// Nothing is read back; whatever the text provokes is discarded before
    /// the next command.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.require("send", SessionState::Running)?;

        let result = match self.process.as_mut() {
            Some(process) => process.write(text.as_bytes()).await.map(|_| ()),
            None => Err(Error::ProcessTerminated),
        };
        self.settle(result).await
    }

    /// Save the game to `filename` under the save directory.
    ///
    /// An existing file with that name is replaced.
    pub async fn save(&mut self, filename: &str) -> Result<Vec<String>> {
        self.require("save", SessionState::Running)?;

        let path = self.config.save_path(filename)?;
        tokio::fs::create_dir_all(&self.config.save_dir).await?;
        if path.exists() {
            debug!("Replacing save file: {}", path.display());
            tokio::fs::remove_file(&path).await?;
        }

        let sequence = self.config.sequences.save_with(&path_arg(&path))?;
        info!("Saving game: {}", path.display());
        self.correlate(&sequence).await
    }

    /// Restore the game from `filename` under the save directory.
    ///
    /// A missing file is rejected before anything is written to the
    /// interpreter, so the session stays running.
    pub async fn restore(&mut self, filename: &str) -> Result<Vec<String>> {
        self.require("restore", SessionState::Running)?;

        let path = self.config.save_path(filename)?;
        if !path.is_file() {
            error!("Save file not found: {}", path.display());
            return Err(Error::NotFound {
                operation: "restore",
                path,
            });
        }

        let sequence = self.config.sequences.restore_with(&path_arg(&path))?;
        info!("Restoring game: {}", path.display());
        self.correlate(&sequence).await
    }

    /// Run the quit sequence and release the interpreter.
    ///
    /// The last quit command is sent without waiting for a reply. The end
    /// marker is appended to the responses.
    pub async fn quit(&mut self) -> Result<Vec<String>> {
        self.require("quit", SessionState::Running)?;

        let (replied, last) = self.config.sequences.quit_parts()?;
        let replied = replied.to_vec();
        let last = last.to_string();

        let mut responses = self.correlate(&replied).await?;

        if let Some(mut process) = self.process.take() {
            debug!("Sending final quit command: {:?}", last);
            if let Err(e) = process.write_line(&last).await {
                warn!("Failed to send final quit command: {}", e);
            }
            if let Err(e) = process.close(self.config.timing.exit_timeout()).await {
                warn!("Failed to reap interpreter after quit: {}", e);
            }
        }

        info!("Session quit: state={}", self.state());
        responses.push(self.config.sequences.quit_end_marker.clone());
        Ok(responses)
    }

    /// Terminate the interpreter.
    pub async fn kill(&mut self) -> Result<()> {
        self.require("kill", SessionState::Running)?;

        if let Some(process) = self.process.take() {
            let status = process.terminate(self.config.timing.exit_timeout()).await?;
            info!("Session killed: status={} state={}", status, self.state());
        }
        Ok(())
    }

    async fn run_start_sequence(&mut self) -> Result<Vec<String>> {
        let start = self.config.sequences.start.clone();
        let start_drop = self.config.sequences.start_drop;
        let filter = self.config.filter;
        let timing = self.config.timing;

        let process = self.process.as_mut().ok_or(Error::ProcessTerminated)?;
        let mut correlator = Correlator::new(process, filter, timing);

        let mut entries = vec![correlator.await_output().await?];
        entries.extend(correlator.correlate(&start).await?);

        // The launch command line counts as entry one but is never captured
        let dropped = start_drop.saturating_sub(1).min(entries.len());
        debug!(
            "Start sequence done: {} entries, dropping {}",
            entries.len(),
            dropped
        );

        Ok(entries.split_off(dropped))
    }

    async fn correlate(&mut self, commands: &[String]) -> Result<Vec<String>> {
        let result = match self.process.as_mut() {
            Some(process) => {
                Correlator::new(process, self.config.filter, self.config.timing)
                    .correlate(commands)
                    .await
            }
            None => Err(Error::ProcessTerminated),
        };
        self.settle(result).await
    }

    /// Stop the interpreter if `result` shows the output stream can no
    /// longer be trusted.
    async fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.breaks_correlation() {
                error!("Lost track of interpreter output, stopping it: {}", e);
                self.release().await;
            }
        }
        result
    }

    async fn release(&mut self) {
        if let Some(process) = self.process.take() {
            if let Err(e) = process.terminate(self.config.timing.exit_timeout()).await {
                warn!("Failed to terminate interpreter: {}", e);
            }
        }
        info!("Session stopped: state={}", self.state());
    }

    fn require(&self, operation: &'static str, required: SessionState) -> Result<()> {
        let state = self.state();
        if state == required {
            Ok(())
        } else {
            Err(Error::invalid_state(operation, state, required))
        }
    }

    fn require_stopped(&self, operation: &'static str) -> Result<()> {
        if self.process.is_some() {
            Err(Error::invalid_state(
                operation,
                SessionState::Running,
                SessionState::Ready,
            ))
        } else {
            Ok(())
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "frotzer-session-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::default();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.pid().is_none());
        assert_eq!(session.config(), &FrotzerConfig::default());
    }

    #[test]
    fn test_init_with_game_file_is_ready() {
        let mut session = Session::default();
        let state = session
            .init(&FrotzerOptions::with_game_file("Ruins.z5"))
            .unwrap();
        assert_eq!(state, SessionState::Ready);
        assert_eq!(session.config().game_file.as_deref(), Some("Ruins.z5"));
    }

    #[test]
    fn test_init_keeps_unset_fields() {
        let mut session = Session::default();
        session
            .init(&FrotzerOptions {
                save_dir: Some(PathBuf::from("/tmp/saves")),
                ..FrotzerOptions::default()
            })
            .unwrap();
        session
            .init(&FrotzerOptions::with_game_file("Ruins.z5"))
            .unwrap();

        assert_eq!(session.config().save_dir, PathBuf::from("/tmp/saves"));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_failed_init_keeps_previous_config() {
        let mut session = Session::with_options(&FrotzerOptions::with_game_file("Ruins.z5")).unwrap();
        let before = session.config().clone();

        let result = session.init(&FrotzerOptions {
            executable: Some(PathBuf::new()),
            ..FrotzerOptions::default()
        });

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(session.config(), &before);
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_operations_rejected_when_idle() {
        let mut session = Session::default();

        let err = session.start().await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                operation: "start",
                state: SessionState::Idle,
                required: SessionState::Ready,
            }
        ));

        assert!(matches!(
            session.command(["look"]).await,
            Err(Error::InvalidState { operation: "command", .. })
        ));
        assert!(matches!(
            session.send("x").await,
            Err(Error::InvalidState { operation: "send", .. })
        ));
        assert!(matches!(
            session.save("game").await,
            Err(Error::InvalidState { operation: "save", .. })
        ));
        assert!(matches!(
            session.restore("game").await,
            Err(Error::InvalidState { operation: "restore", .. })
        ));
        assert!(matches!(
            session.quit().await,
            Err(Error::InvalidState { operation: "quit", .. })
        ));
        assert!(matches!(
            session.kill().await,
            Err(Error::InvalidState { operation: "kill", .. })
        ));
    }

    #[tokio::test]
    async fn test_command_rejected_when_ready() {
        let mut session = Session::with_options(&FrotzerOptions::with_game_file("Ruins.z5")).unwrap();

        let err = session.command_one("look").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "command(): not allowed in 'ready' state (requires 'running')"
        );
    }

    #[tokio::test]
    async fn test_start_missing_game_file() {
        let dir = temp_dir("missing-game");
        let mut session = Session::with_options(&FrotzerOptions {
            story_dir: Some(dir.clone()),
            ..FrotzerOptions::with_game_file("nowhere.z5")
        })
        .unwrap();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, Error::NotFound { operation: "start", .. }));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_start_missing_executable() {
        let dir = temp_dir("missing-exec");
        std::fs::write(dir.join("Ruins.z5"), b"").unwrap();

        let mut session = Session::with_options(&FrotzerOptions {
            executable: Some(dir.join("no-such-interpreter")),
            story_dir: Some(dir.clone()),
            ..FrotzerOptions::with_game_file("Ruins.z5")
        })
        .unwrap();

        let err = session.start().await.unwrap_err();
        assert!(matches!(err, Error::SpawnFailed { .. }));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn test_start_with_rolls_back_on_failure() {
        let dir = temp_dir("rollback");
        let mut session = Session::with_options(&FrotzerOptions {
            story_dir: Some(dir.clone()),
            ..FrotzerOptions::default()
        })
        .unwrap();
        let before = session.config().clone();

        let result = session
            .start_with(&FrotzerOptions::with_game_file("nowhere.z5"))
            .await;

        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert_eq!(session.config(), &before);
        assert_eq!(session.state(), SessionState::Idle);
    }
}
