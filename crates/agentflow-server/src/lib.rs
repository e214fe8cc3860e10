// ABOUTME: HTTP server for agentflow, providing the flow REST API, SSE streaming, and the agent detail panel.
// ABOUTME: Uses Axum with a shared flow actor; a background persister mirrors every change to local storage.

pub mod api;
pub mod app_state;
pub mod config;
pub mod persister;
pub mod routes;
pub mod web;

pub use app_state::{AppState, SharedState};
pub use config::{AgentflowConfig, ConfigError};
pub use routes::create_router;
