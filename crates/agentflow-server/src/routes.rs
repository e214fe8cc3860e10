// ABOUTME: Route definitions for the agentflow HTTP server.
// ABOUTME: Assembles the JSON API, SSE stream, and HTMX panel routes into one traced Axum Router.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;
use crate::web;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(web::index))
        .route("/api/flow", get(api::flow::get_flow))
        .route("/api/flow/commands", post(api::flow::submit_command))
        .route("/api/flow/agents", post(api::flow::create_agent))
        .route("/api/flow/agents/{id}", delete(api::flow::delete_agent))
        .route("/api/flow/connect", post(api::flow::connect))
        .route("/api/flow/events/stream", get(api::stream::event_stream))
        .route("/api/flow/export", get(api::transfer::export_flow))
        .route("/api/flow/import", post(api::transfer::import_flow))
        .route("/web/agents", get(web::agent_list).post(web::create_agent))
        .route("/web/agents/{id}/delete", post(web::delete_agent))
        .route("/web/nodes/{id}/click", post(web::click_node))
        .route("/web/panel", get(web::panel))
        .route("/web/panel/close", post(web::close_panel))
        .route("/web/panel/submit", post(web::submit_panel))
        .route("/web/panel/fields/{field}", post(web::update_field))
        .route("/web/panel/tools", post(web::add_tool))
        .route("/web/panel/tools/{tool}/fields/{field}", post(web::update_tool))
        .route("/web/panel/tools/{tool}/remove", post(web::remove_tool))
        .route("/web/panel/tools/{tool}/parameters", post(web::add_parameter))
        .route(
            "/web/panel/tools/{tool}/parameters/{param}/fields/{field}",
            post(web::update_parameter),
        )
        .route(
            "/web/panel/tools/{tool}/parameters/{param}/remove",
            post(web::remove_parameter),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
