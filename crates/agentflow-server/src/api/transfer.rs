// ABOUTME: Export and import handlers moving whole flows in and out as flow.json.
// ABOUTME: Imports are parsed and validated before the actor sees them; a bad file changes nothing.

use agentflow_core::{Command, FlowDocument};
use agentflow_store::EXPORT_FILE_NAME;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;

use crate::api::actor_error_response;
use crate::app_state::SharedState;

/// User-facing message for any file that is not a usable flow document.
pub const INVALID_FILE_MESSAGE: &str = "Invalid file format. Please upload a valid JSON file.";

/// GET /api/flow/export - Download the current flow as flow.json.
pub async fn export_flow(State(state): State<SharedState>) -> impl IntoResponse {
    let document = state.actor.document().await;
    let json = match document.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("failed to serialize flow for export: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to export flow" })),
            )
                .into_response();
        }
    };

    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        json,
    )
        .into_response()
}

/// POST /api/flow/import - Replace the flow with the uploaded document.
///
/// An empty body means no file was chosen and is a no-op. Anything that is
/// not valid UTF-8, not JSON, or not a consistent flow is rejected with a
/// single error and leaves the flow untouched.
pub async fn import_flow(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let text = match std::str::from_utf8(&body) {
        Ok(text) => text,
        Err(e) => return invalid_file(e.to_string()),
    };
    if text.trim().is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let document = match FlowDocument::parse(text) {
        Ok(document) => document,
        Err(e) => return invalid_file(e.to_string()),
    };

    match state.dispatch(Command::LoadFlow { document }).await {
        Ok(_) => {
            let flow = state.actor.read_state().await;
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "agents": flow.agents.len(),
                    "nodes": flow.nodes.len(),
                    "edges": flow.edges.len(),
                })),
            )
                .into_response()
        }
        Err(e) => actor_error_response(e),
    }
}

fn invalid_file(detail: String) -> axum::response::Response {
    tracing::warn!("rejecting flow import: {}", detail);
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": INVALID_FILE_MESSAGE })),
    )
        .into_response()
}
