//! MCP Tool Types
//!
//! Parameter and response types for every tool the server exposes. All of
//! them derive `JsonSchema` so rmcp can publish their input schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use frotzer_core::{FrotzerConfig, FrotzerOptions, SessionState};

// =============================================================================
// Configuration and Lifecycle Tools
// =============================================================================

/// Parameters for frotzer_init
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InitParams {
    /// Configuration fields to change; unset fields keep their current value
    #[serde(flatten)]
    pub options: FrotzerOptions,
}

/// Parameters for frotzer_start
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartParams {
    /// Configuration fields to apply before starting (e.g. game_file).
    /// The previous configuration is restored if the start fails
    #[serde(flatten)]
    pub options: FrotzerOptions,
}

/// Parameters for frotzer_quit
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QuitParams {}

/// Parameters for frotzer_kill
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct KillParams {}

/// Parameters for frotzer_status
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StatusParams {}

// =============================================================================
// Game Interaction Tools
// =============================================================================

/// Parameters for frotzer_command
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommandParams {
    /// Commands to send in order (e.g. ["open mailbox", "read leaflet"]).
    /// Each gets exactly one response
    pub commands: Vec<String>,
}

/// Parameters for frotzer_send
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendParams {
    /// Raw text to write; no newline is appended and no output is read
    pub text: String,
}

/// Parameters for frotzer_save
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SaveParams {
    /// Save file name, relative to the save directory
    pub filename: String,
}

/// Parameters for frotzer_restore
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RestoreParams {
    /// Save file name, relative to the save directory
    pub filename: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Response for tools that return interpreter output
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponsesResponse {
    /// One filtered response per command, in order
    pub responses: Vec<String>,

    /// Session state after the operation
    pub state: SessionState,
}

/// Response for tools that only change state
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StateResponse {
    /// Session state after the operation
    pub state: SessionState,

    /// Human-readable summary
    pub message: String,
}

/// Response for frotzer_status
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
    /// Current session state
    pub state: SessionState,

    /// Interpreter process id (only while running)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Current configuration
    pub config: FrotzerConfig,
}
