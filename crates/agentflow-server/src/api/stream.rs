// ABOUTME: SSE event streaming handler for real-time flow event delivery.
// ABOUTME: Subscribes to the flow actor's broadcast channel and converts events to SSE format.

use agentflow_core::Event;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::app_state::SharedState;

/// Convert a broadcast receiver into an SSE-compatible stream. Lagged
/// receivers skip the missed events rather than ending the stream.
fn event_stream_from_receiver(
    rx: broadcast::Receiver<Event>,
) -> impl Stream<Item = Result<SseEvent, axum::Error>> {
    BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default()
                    .event(event.payload.name())
                    .id(event.event_id.to_string())
                    .data(data)))
            }
            Err(e) => {
                tracing::warn!("sse subscriber dropped events: {}", e);
                None
            }
        }
    })
}

/// GET /api/flow/events/stream - SSE endpoint for real-time event streaming.
pub async fn event_stream(State(state): State<SharedState>) -> impl IntoResponse {
    let stream = event_stream_from_receiver(state.actor.subscribe());

    Sse::new(stream).keep_alive(KeepAlive::default())
}
