//! Frotzer MCP Server Implementation
//!
//! This module implements the MCP server using rmcp 0.9's #[tool_router] pattern.
//! It routes MCP tool calls to a single interpreter session.

use std::sync::Arc;
use tokio::sync::Mutex;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use serde::Serialize;

use tracing::{debug, error, info, instrument};

use frotzer_core::{Error, FrotzerOptions};
use frotzer_session::Session;

use crate::tools::*;

/// Frotzer MCP Server
///
/// Owns one session and exposes it via MCP tools. Tool calls are serialized
/// by the session lock, in arrival order.
#[derive(Clone)]
pub struct FrotzerMcpServer {
    /// The interpreter session
    session: Arc<Mutex<Session>>,
    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FrotzerMcpServer {
    /// Create a server with a default (idle) session
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    /// Create a server around an existing session
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            tool_router: Self::tool_router(),
        }
    }

    /// Change the configuration
    #[tool(
        description = "Set configuration fields (game_file, story_dir, save_dir, executable, args, filter, sequences, timing). Unset fields keep their value. Not allowed while a game is running"
    )]
    #[instrument(skip_all)]
    async fn frotzer_init(
        &self,
        Parameters(params): Parameters<InitParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Init options: {:?}", params.options);

        let mut session = self.session.lock().await;
        let state = session
            .init(&params.options)
            .map_err(|e| to_mcp_error("init", e))?;

        let response = StateResponse {
            state,
            message: format!("Configuration updated, session is {state}"),
        };
        Ok(json_result(&response))
    }

    /// Start the interpreter
    #[tool(
        description = "Start the game. Optional configuration fields (e.g. game_file) are applied first. Returns the opening text"
    )]
    #[instrument(skip_all)]
    async fn frotzer_start(
        &self,
        Parameters(params): Parameters<StartParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;

        let result = if params.options == FrotzerOptions::default() {
            session.start().await
        } else {
            session.start_with(&params.options).await
        };
        let responses = result.map_err(|e| to_mcp_error("start", e))?;

        info!("Game started: {} opening responses", responses.len());

        let response = ResponsesResponse {
            responses,
            state: session.state(),
        };
        Ok(json_result(&response))
    }

    /// Send commands and collect one response per command
    #[tool(
        description = "Send one or more game commands in order. Returns exactly one response per command"
    )]
    #[instrument(skip_all)]
    async fn frotzer_command(
        &self,
        Parameters(params): Parameters<CommandParams>,
    ) -> Result<CallToolResult, McpError> {
        debug!("Commands: {:?}", params.commands);

        let mut session = self.session.lock().await;
        let responses = session
            .command(&params.commands)
            .await
            .map_err(|e| to_mcp_error("command", e))?;

        let response = ResponsesResponse {
            responses,
            state: session.state(),
        };
        Ok(json_result(&response))
    }

    /// Write raw text without waiting for output
    #[tool(
        description = "Write raw text to the game without a trailing newline and without reading a response"
    )]
    #[instrument(skip_all)]
    async fn frotzer_send(
        &self,
        Parameters(params): Parameters<SendParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        session
            .send(&params.text)
            .await
            .map_err(|e| to_mcp_error("send", e))?;

        let response = StateResponse {
            state: session.state(),
            message: format!("Sent {} bytes", params.text.len()),
        };
        Ok(json_result(&response))
    }

    /// Save the game
    #[tool(description = "Save the game under the save directory. An existing file is replaced")]
    #[instrument(skip_all)]
    async fn frotzer_save(
        &self,
        Parameters(params): Parameters<SaveParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        let responses = session
            .save(&params.filename)
            .await
            .map_err(|e| to_mcp_error("save", e))?;

        let response = ResponsesResponse {
            responses,
            state: session.state(),
        };
        Ok(json_result(&response))
    }

    /// Restore the game
    #[tool(
        description = "Restore a game saved under the save directory. Fails without touching the game if the file does not exist"
    )]
    #[instrument(skip_all)]
    async fn frotzer_restore(
        &self,
        Parameters(params): Parameters<RestoreParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        let responses = session
            .restore(&params.filename)
            .await
            .map_err(|e| to_mcp_error("restore", e))?;

        let response = ResponsesResponse {
            responses,
            state: session.state(),
        };
        Ok(json_result(&response))
    }

    /// Quit the game
    #[tool(description = "Quit the game through its quit sequence. The last response is the end marker")]
    #[instrument(skip_all)]
    async fn frotzer_quit(
        &self,
        Parameters(_params): Parameters<QuitParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        let responses = session
            .quit()
            .await
            .map_err(|e| to_mcp_error("quit", e))?;

        let response = ResponsesResponse {
            responses,
            state: session.state(),
        };
        Ok(json_result(&response))
    }

    /// Terminate the interpreter
    #[tool(description = "Terminate the game process immediately, without saving")]
    #[instrument(skip_all)]
    async fn frotzer_kill(
        &self,
        Parameters(_params): Parameters<KillParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        session
            .kill()
            .await
            .map_err(|e| to_mcp_error("kill", e))?;

        let response = StateResponse {
            state: session.state(),
            message: "Game process terminated".to_string(),
        };
        Ok(json_result(&response))
    }

    /// Report state and configuration
    #[tool(description = "Get the session state (idle, ready, running) and the current configuration")]
    #[instrument(skip_all)]
    async fn frotzer_status(
        &self,
        Parameters(_params): Parameters<StatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let session = self.session.lock().await;

        let response = StatusResponse {
            state: session.state(),
            pid: session.pid(),
            config: session.config().clone(),
        };
        Ok(json_result(&response))
    }
}

impl Default for FrotzerMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a session error to an MCP error.
///
/// Errors caused by the request (state, configuration, missing file) are
/// reported as invalid params; everything else as an internal error.
fn to_mcp_error(operation: &str, e: Error) -> McpError {
    error!("{} failed: {}", operation, e);

    let code = if e.is_caller_error() {
        ErrorCode(-32602) // Invalid params
    } else {
        ErrorCode(-32603) // Internal error
    };
    McpError::new(code, e.to_string(), None)
}

fn json_result<T: Serialize>(response: &T) -> CallToolResult {
    let text = serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize response: {e}\"}}"));
    CallToolResult::success(vec![Content::text(text)])
}

// Implement the ServerHandler trait to define server capabilities
#[tool_handler]
impl rmcp::ServerHandler for FrotzerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Frotzer MCP Server - Play interactive fiction through dfrotz. \
                 Use frotzer_start with a game_file to begin, frotzer_command to send \
                 commands (one response per command), frotzer_save and frotzer_restore \
                 for save files, and frotzer_quit to end the game."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
