//! Session state.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session.
///
/// The state is never stored by a session; it is derived from whether a
/// process is held and whether the configuration is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Configuration is incomplete, a game cannot be started yet
    Idle,
    /// Configuration is complete and no process is running
    Ready,
    /// A process is running and accepts commands
    Running,
}

impl SessionState {
    /// Derive the state from its two inputs.
    pub fn derive(process_running: bool, config_complete: bool) -> Self {
        if process_running {
            SessionState::Running
        } else if config_complete {
            SessionState::Ready
        } else {
            SessionState::Idle
        }
    }

    /// Name of the state as used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Ready => "ready",
            SessionState::Running => "running",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_running_wins() {
        assert_eq!(SessionState::derive(true, false), SessionState::Running);
        assert_eq!(SessionState::derive(true, true), SessionState::Running);
    }

    #[test]
    fn test_derive_ready_and_idle() {
        assert_eq!(SessionState::derive(false, true), SessionState::Ready);
        assert_eq!(SessionState::derive(false, false), SessionState::Idle);
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Ready.to_string(), "ready");
        assert_eq!(SessionState::Running.to_string(), "running");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&SessionState::Running).unwrap();
        assert_eq!(json, "\"running\"");

        let state: SessionState = serde_json::from_str("\"ready\"").unwrap();
        assert_eq!(state, SessionState::Ready);
    }
}
