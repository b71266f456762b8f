//! # Frotzer MCP Server
//!
//! Model Context Protocol server for AI agents to play interactive fiction
//! through dfrotz.
//!
//! ## Overview
//!
//! This server provides MCP tools for:
//! - Configuration (init, status)
//! - Lifecycle (start, quit, kill)
//! - Play (command, send)
//! - Save files (save, restore)
//!
//! ## Usage
//!
//! ```text
//! frotzer [--config <file.yaml>] [--game <file>]
//! ```
//!
//! Logs go to stderr; stdout carries the protocol. Set `RUST_LOG` to change
//! the log level.
//!
//! ## Architecture
//!
//! This is Layer 3 - the MCP server binary that ties together:
//! - frotzer-core: Configuration, errors and filters
//! - frotzer-session: Session lifecycle and response correlation

use std::path::PathBuf;

use rmcp::{transport::stdio, ServiceExt};

use frotzer::FrotzerMcpServer;
use frotzer_core::{FrotzerConfig, FrotzerOptions};
use frotzer_session::Session;

/// Command line arguments.
#[derive(Debug, Default)]
struct Args {
    /// YAML configuration file
    config: Option<PathBuf>,
    /// Game file, overriding the configuration
    game: Option<String>,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--config requires a file"))?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--game" | "-g" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--game requires a file"))?;
                    parsed.game = Some(value);
                }
                other => anyhow::bail!("Unknown argument: {other}"),
            }
        }

        Ok(parsed)
    }

    fn load_config(&self) -> anyhow::Result<FrotzerConfig> {
        let config = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                FrotzerConfig::from_file(path)?
            }
            None => FrotzerConfig::default(),
        };

        match &self.game {
            Some(game) => Ok(config.merged(&FrotzerOptions::with_game_file(game.clone()))?),
            None => Ok(config),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (stderr, stdout is the MCP transport)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args())?;
    let config = args.load_config().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    tracing::info!(
        "Frotzer MCP Server v{} starting: executable='{}' game={:?}",
        env!("CARGO_PKG_VERSION"),
        config.executable.display(),
        config.game_file
    );

    let server = FrotzerMcpServer::with_session(Session::new(config));

    tracing::info!("Server initialized, starting stdio transport...");

    // Serve the MCP server over stdio
    let service = server.serve(stdio()).await.map_err(|e| {
        tracing::error!("Error starting server: {}", e);
        e
    })?;

    tracing::info!("Frotzer MCP Server running on stdio");

    // Wait for the service to complete
    service.waiting().await?;

    tracing::info!("Frotzer MCP Server shutting down");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<Args> {
        Args::parse(
            std::iter::once("frotzer")
                .chain(args.iter().copied())
                .map(String::from),
        )
    }

    #[test]
    fn test_parse_no_args() {
        let args = parse(&[]).unwrap();
        assert!(args.config.is_none());
        assert!(args.game.is_none());
    }

    #[test]
    fn test_parse_config_and_game() {
        let args = parse(&["--config", "frotzer.yaml", "-g", "Ruins.z5"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("frotzer.yaml")));
        assert_eq!(args.game.as_deref(), Some("Ruins.z5"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }

    #[test]
    fn test_game_overrides_config() {
        let args = parse(&["--game", "Ruins.z5"]).unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.game_file.as_deref(), Some("Ruins.z5"));
        assert_eq!(config.executable, PathBuf::from("./frotz/dfrotz"));
    }
}
