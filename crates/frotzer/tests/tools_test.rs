//! Tests for the MCP tool parameter and response types.

use frotzer::{CommandParams, InitParams, ResponsesResponse, StartParams, StatusResponse};
use frotzer_core::{FrotzerConfig, OutputFilter, SessionState};
use serde_json::json;

#[test]
fn test_init_params_accept_flat_options() {
    let params: InitParams = serde_json::from_value(json!({
        "game_file": "Ruins.z5",
        "filter": "oneline",
        "timing": { "response_timeout_ms": 1000 }
    }))
    .unwrap();

    assert_eq!(params.options.game_file.as_deref(), Some("Ruins.z5"));
    assert_eq!(params.options.filter, Some(OutputFilter::Oneline));
    assert_eq!(
        params.options.timing.and_then(|t| t.response_timeout_ms),
        Some(1000)
    );
    assert!(params.options.save_dir.is_none());
}

#[test]
fn test_init_params_accept_short_names() {
    let params: InitParams = serde_json::from_value(json!({
        "gamefile": "Ruins.z5",
        "dfexec": "/usr/games/dfrotz",
        "seq": { "quit_endmarker": "THE END" }
    }))
    .unwrap();

    assert_eq!(params.options.game_file.as_deref(), Some("Ruins.z5"));
    assert_eq!(
        params.options.executable.as_deref(),
        Some(std::path::Path::new("/usr/games/dfrotz"))
    );
    assert_eq!(
        params
            .options
            .sequences
            .and_then(|s| s.quit_end_marker)
            .as_deref(),
        Some("THE END")
    );
}

#[test]
fn test_empty_start_params() {
    let params: StartParams = serde_json::from_value(json!({})).unwrap();
    assert_eq!(params.options, Default::default());
}

#[test]
fn test_unknown_filter_is_rejected() {
    let result: Result<InitParams, _> = serde_json::from_value(json!({ "filter": "fancy" }));
    assert!(result.is_err());
}

#[test]
fn test_command_params() {
    let params: CommandParams =
        serde_json::from_value(json!({ "commands": ["open mailbox", ""] })).unwrap();
    assert_eq!(params.commands, vec!["open mailbox", ""]);
}

#[test]
fn test_responses_serialization() {
    let response = ResponsesResponse {
        responses: vec!["Taken.".to_string(), "<END>".to_string()],
        state: SessionState::Ready,
    };

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(
        value,
        json!({ "responses": ["Taken.", "<END>"], "state": "ready" })
    );
}

#[test]
fn test_status_serialization() {
    let response = StatusResponse {
        state: SessionState::Idle,
        pid: None,
        config: FrotzerConfig::default(),
    };

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["state"], "idle");
    assert_eq!(value["config"]["filter"], "compact");
    assert_eq!(value["config"]["args"], json!(["-m"]));
    assert_eq!(value["config"]["sequences"]["quit"], json!(["quit", "yes"]));
    assert!(value.get("pid").is_none());
}
