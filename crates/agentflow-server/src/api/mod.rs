// ABOUTME: API module containing the JSON handlers for the agentflow REST API.
// ABOUTME: Organized into sub-modules for flow mutation, file transfer, and event streaming.

pub mod flow;
pub mod stream;
pub mod transfer;

use agentflow_core::ActorError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Map an actor error onto the JSON error response used by every API handler.
pub(crate) fn actor_error_response(err: ActorError) -> Response {
    let status = match err {
        ActorError::NodeNotFound(_) => StatusCode::NOT_FOUND,
        ActorError::DuplicateNode(_) => StatusCode::CONFLICT,
        ActorError::AgentNodeWithoutAgent(_) | ActorError::InvalidDocument(_) => {
            StatusCode::BAD_REQUEST
        }
        ActorError::ChannelClosed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}
