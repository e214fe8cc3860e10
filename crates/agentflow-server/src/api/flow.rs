// ABOUTME: Flow API handlers: read the current document, submit commands, create/delete agents, connect nodes.
// ABOUTME: Every mutation goes through the flow actor; persistence is handled by the background persister.

use agentflow_core::{Command, EventPayload, Position};
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::api::actor_error_response;
use crate::app_state::SharedState;

/// GET /api/flow - The current flow document with agent node data filled in.
pub async fn get_flow(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.actor.document().await)
}

/// POST /api/flow/commands - Submit a typed command to the flow actor.
pub async fn submit_command(
    State(state): State<SharedState>,
    Json(cmd): Json<Command>,
) -> impl IntoResponse {
    match state.dispatch(cmd).await {
        Ok(events) => (
            StatusCode::OK,
            Json(serde_json::json!({ "events": events })),
        )
            .into_response(),
        Err(e) => actor_error_response(e),
    }
}

/// Request body for creating an agent. The position is optional.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAgentRequest {
    #[serde(default)]
    pub position: Option<Position>,
}

/// POST /api/flow/agents - Create an agent together with its node. An
/// empty body places it at the default position.
pub async fn create_agent(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateAgentRequest::default()
    } else {
        match serde_json::from_slice::<CreateAgentRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("invalid request: {}", e) })),
                )
                    .into_response();
            }
        }
    };
    let position = request.position;

    let events = match state.dispatch(Command::CreateAgent { position }).await {
        Ok(events) => events,
        Err(e) => return actor_error_response(e),
    };

    match events.into_iter().next().map(|event| event.payload) {
        Some(EventPayload::AgentCreated { agent, node }) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "agent": agent, "node": node })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "agent was not created" })),
        )
            .into_response(),
    }
}

/// DELETE /api/flow/agents/{id} - Delete an agent, its node, and its edges.
/// An unknown id is a no-op that returns no events.
pub async fn delete_agent(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.dispatch(Command::DeleteAgent { agent_id: id }).await {
        Ok(events) => (
            StatusCode::OK,
            Json(serde_json::json!({ "events": events })),
        )
            .into_response(),
        Err(e) => actor_error_response(e),
    }
}

/// A connection drawn on the canvas, in the canvas's own field names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

/// POST /api/flow/connect - Add an edge between two existing nodes.
pub async fn connect(
    State(state): State<SharedState>,
    Json(req): Json<ConnectRequest>,
) -> impl IntoResponse {
    let cmd = Command::Connect {
        source: req.source,
        target: req.target,
        source_handle: req.source_handle,
        target_handle: req.target_handle,
    };

    let events = match state.dispatch(cmd).await {
        Ok(events) => events,
        Err(e) => return actor_error_response(e),
    };

    match events.into_iter().next().map(|event| event.payload) {
        Some(EventPayload::EdgeAdded { edge }) => {
            (StatusCode::CREATED, Json(serde_json::json!({ "edge": edge }))).into_response()
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "edge was not added" })),
        )
            .into_response(),
    }
}
