//! Error types for Frotzer.

use std::path::PathBuf;

use thiserror::Error;

use crate::SessionState;

/// Main error type for Frotzer operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted in a state that forbids it
    #[error("{operation}(): not allowed in '{state}' state (requires '{required}')")]
    InvalidState {
        /// Operation that was rejected
        operation: &'static str,
        /// State the session was in
        state: SessionState,
        /// State the operation requires
        required: SessionState,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A file required by the operation does not exist
    #[error("{operation}(): file not found: {}", path.display())]
    NotFound {
        /// Operation that was rejected
        operation: &'static str,
        /// Path that was looked up
        path: PathBuf,
    },

    /// The child process could not be spawned
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        /// Program that was spawned
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child process closed its output before answering
    #[error("Process terminated unexpectedly")]
    ProcessTerminated,

    /// No output arrived within the response timeout
    #[error("Timeout waiting for process output after {0}ms")]
    ResponseTimeout(u64),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an invalid-state error for `operation`.
    pub fn invalid_state(
        operation: &'static str,
        state: SessionState,
        required: SessionState,
    ) -> Self {
        Error::InvalidState {
            operation,
            state,
            required,
        }
    }

    /// Whether the error was caused by the caller (state, configuration or
    /// missing file) rather than by the process or the OS.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidState { .. } | Error::InvalidConfig(_) | Error::NotFound { .. }
        )
    }

    /// Whether the error leaves the output stream in an unknown position.
    pub fn breaks_correlation(&self) -> bool {
        matches!(self, Error::ProcessTerminated | Error::ResponseTimeout(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
