// ABOUTME: Shared application state for the agentflow HTTP server.
// ABOUTME: Holds the flow actor handle, the editor session, the storage adapter, and the persister task.

use std::sync::Arc;

use agentflow_core::{ActorError, Command, EditorSession, Event, FlowActorHandle, FlowState, spawn};
use agentflow_store::FlowStorage;
use tokio::sync::Mutex;

use crate::persister::spawn_flow_persister;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub actor: FlowActorHandle,
    /// The detail panel: at most one agent draft open at a time.
    pub session: Mutex<EditorSession>,
    pub storage: Arc<FlowStorage>,
    /// Background task mirroring every settled change into storage.
    pub persister: tokio::task::JoinHandle<()>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Spawn the flow actor over `initial` and the persister that writes the
    /// flow back to `storage`. Must be called from within a tokio runtime.
    pub fn new(initial: FlowState, storage: FlowStorage) -> Self {
        let storage = Arc::new(storage);
        let actor = spawn(initial);
        let persister = spawn_flow_persister(&actor, Arc::clone(&storage));
        Self {
            actor,
            session: Mutex::new(EditorSession::new()),
            storage,
            persister,
        }
    }

    /// Send a command to the actor, then close the detail panel if the agent
    /// it was bound to no longer exists.
    pub async fn dispatch(&self, cmd: Command) -> Result<Vec<Event>, ActorError> {
        let events = self.actor.send_command(cmd).await?;
        if !events.is_empty() {
            let flow = self.actor.read_state().await;
            let mut session = self.session.lock().await;
            let stale = session
                .panel()
                .map(|draft| draft.agent_id().to_string())
                .filter(|agent_id| flow.agent(agent_id).is_none());
            if let Some(agent_id) = stale {
                tracing::debug!(%agent_id, "closing detail panel bound to a removed agent");
                session.forget_agent(&agent_id);
            }
        }
        Ok(events)
    }
}
