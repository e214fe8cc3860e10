// ABOUTME: Async actor that owns the flow state, processing commands one at a time via tokio channels.
// ABOUTME: Provides FlowActorHandle for sending commands, subscribing to events, and reading state.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot};

use crate::changes::{EdgeChange, NodeChange};
use crate::command::Command;
use crate::document::{DocumentError, FlowDocument};
use crate::event::{Event, EventPayload};
use crate::model::{Agent, DEFAULT_NODE_POSITION, Edge, Node};
use crate::state::FlowState;

/// Errors that can occur when processing commands in the actor.
#[derive(Debug, Error)]
pub enum ActorError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node {0} already exists")]
    DuplicateNode(String),

    #[error("agent node {0} must be created together with its agent")]
    AgentNodeWithoutAgent(String),

    #[error(transparent)]
    InvalidDocument(#[from] DocumentError),

    #[error("actor channel closed")]
    ChannelClosed,
}

/// Message type sent through the command channel: a command paired with
/// a oneshot sender for the response.
type CommandMessage = (Command, oneshot::Sender<Result<Vec<Event>, ActorError>>);

/// Public handle for interacting with the flow actor. Supports sending
/// commands, subscribing to events, and reading the current state.
#[derive(Clone)]
pub struct FlowActorHandle {
    cmd_tx: mpsc::Sender<CommandMessage>,
    event_tx: broadcast::Sender<Event>,
    state: Arc<RwLock<FlowState>>,
}

impl FlowActorHandle {
    /// Send a command to the actor and await the resulting events.
    pub async fn send_command(&self, cmd: Command) -> Result<Vec<Event>, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send((cmd, tx))
            .await
            .map_err(|_| ActorError::ChannelClosed)?;
        rx.await.map_err(|_| ActorError::ChannelClosed)?
    }

    /// Subscribe to the event broadcast stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get a read-only reference to the shared state.
    pub async fn read_state(&self) -> tokio::sync::RwLockReadGuard<'_, FlowState> {
        self.state.read().await
    }

    /// Snapshot the current state as a flow document.
    pub async fn document(&self) -> FlowDocument {
        self.state.read().await.to_document()
    }
}

/// Spawn a new flow actor task and return the handle for interacting with it.
/// The actor processes commands sequentially, converts them to events,
/// applies them to state, and broadcasts them to subscribers.
pub fn spawn(initial_state: FlowState) -> FlowActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel::<CommandMessage>(64);
    let (event_tx, _) = broadcast::channel::<Event>(256);
    let last_event_id = initial_state.last_event_id;
    let state = Arc::new(RwLock::new(initial_state));

    let handle = FlowActorHandle {
        cmd_tx,
        event_tx: event_tx.clone(),
        state: Arc::clone(&state),
    };

    let actor = FlowActor {
        state,
        cmd_rx,
        event_tx,
        next_event_id: last_event_id + 1,
    };

    tokio::spawn(actor.run());

    handle
}

/// The internal actor that processes commands in a loop.
struct FlowActor {
    state: Arc<RwLock<FlowState>>,
    cmd_rx: mpsc::Receiver<CommandMessage>,
    event_tx: broadcast::Sender<Event>,
    next_event_id: u64,
}

impl FlowActor {
    async fn run(mut self) {
        while let Some((cmd, reply_tx)) = self.cmd_rx.recv().await {
            let result = self.process_command(cmd).await;
            // Ignore send error: the caller may have dropped their receiver
            let _ = reply_tx.send(result);
        }
        tracing::debug!("flow actor stopped");
    }

    async fn process_command(&mut self, cmd: Command) -> Result<Vec<Event>, ActorError> {
        let events = self.command_to_events(cmd).await?;

        // All events of one command land under a single write lock
        {
            let mut state = self.state.write().await;
            for event in &events {
                state.apply(event);
            }
        }

        for event in &events {
            // No active subscribers is fine
            let _ = self.event_tx.send(event.clone());
        }

        Ok(events)
    }

    /// Convert a command into zero or more events, validating against the
    /// current state.
    async fn command_to_events(&mut self, cmd: Command) -> Result<Vec<Event>, ActorError> {
        let state = self.state.read().await;

        let payloads = match cmd {
            Command::CreateAgent { position } => {
                let agent = Agent::generate();
                let node = Node::agent(agent.id.clone(), position.unwrap_or(DEFAULT_NODE_POSITION));
                tracing::info!(agent_id = %agent.id, "creating agent");
                vec![EventPayload::AgentCreated { agent, node }]
            }

            Command::UpdateAgent { agent } => {
                if state.agent(&agent.id).is_none() {
                    tracing::debug!(agent_id = %agent.id, "ignoring update for unknown agent");
                    Vec::new()
                } else {
                    vec![EventPayload::AgentUpdated { agent }]
                }
            }

            Command::DeleteAgent { agent_id } => {
                if state.agent(&agent_id).is_none() {
                    tracing::debug!(%agent_id, "ignoring delete for unknown agent");
                    Vec::new()
                } else {
                    tracing::info!(%agent_id, "deleting agent");
                    vec![EventPayload::AgentDeleted { agent_id }]
                }
            }

            Command::AddNode { node } => {
                if node.is_agent() {
                    return Err(ActorError::AgentNodeWithoutAgent(node.id));
                }
                if state.node(&node.id).is_some() {
                    return Err(ActorError::DuplicateNode(node.id));
                }
                vec![EventPayload::NodeAdded { node }]
            }

            Command::ApplyNodeChanges { changes } => node_change_payloads(&state, changes),

            Command::ApplyEdgeChanges { changes } => edge_change_payloads(&state, changes),

            Command::Connect {
                source,
                target,
                source_handle,
                target_handle,
            } => {
                for endpoint in [&source, &target] {
                    if state.node(endpoint).is_none() {
                        return Err(ActorError::NodeNotFound(endpoint.clone()));
                    }
                }
                let edge = Edge::connect(source, target, source_handle, target_handle);
                vec![EventPayload::EdgeAdded { edge }]
            }

            Command::LoadFlow { document } => {
                let document = document.validate()?;
                tracing::info!(
                    agents = document.agents.len(),
                    nodes = document.nodes.len(),
                    edges = document.edges.len(),
                    "loading flow"
                );
                vec![EventPayload::FlowLoaded { document }]
            }
        };

        // Drop the read lock before creating events
        drop(state);

        let now = Utc::now();
        let events = payloads
            .into_iter()
            .map(|payload| {
                let event_id = self.next_event_id;
                self.next_event_id += 1;
                Event {
                    event_id,
                    timestamp: now,
                    payload,
                }
            })
            .collect();

        Ok(events)
    }
}

/// Translate canvas node deltas into events. Deltas naming unknown nodes are
/// dropped. Removing an agent node deletes the agent with it.
fn node_change_payloads(state: &FlowState, changes: Vec<NodeChange>) -> Vec<EventPayload> {
    changes
        .into_iter()
        .filter_map(|change| {
            let node = state.node(change.id())?;
            let is_agent = node.is_agent();
            match change {
                NodeChange::Position {
                    id,
                    position,
                    dragging,
                } => Some(EventPayload::NodeMoved {
                    node_id: id,
                    position,
                    dragging,
                }),
                NodeChange::Dimensions { id, dimensions } => {
                    dimensions.map(|dimensions| EventPayload::NodeResized {
                        node_id: id,
                        dimensions,
                    })
                }
                NodeChange::Select { id, selected } => Some(EventPayload::NodeSelected {
                    node_id: id,
                    selected,
                }),
                NodeChange::Remove { id } if is_agent => {
                    Some(EventPayload::AgentDeleted { agent_id: id })
                }
                NodeChange::Remove { id } => Some(EventPayload::NodeRemoved { node_id: id }),
            }
        })
        .collect()
}

/// Translate canvas edge deltas into events, dropping unknown edge ids.
fn edge_change_payloads(state: &FlowState, changes: Vec<EdgeChange>) -> Vec<EventPayload> {
    changes
        .into_iter()
        .filter(|change| state.edge(change.id()).is_some())
        .map(|change| match change {
            EdgeChange::Select { id, selected } => EventPayload::EdgeSelected {
                edge_id: id,
                selected,
            },
            EdgeChange::Remove { id } => EventPayload::EdgeRemoved { edge_id: id },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    async fn create_agent(handle: &FlowActorHandle) -> String {
        let events = handle
            .send_command(Command::CreateAgent { position: None })
            .await
            .unwrap();
        match &events[0].payload {
            EventPayload::AgentCreated { agent, .. } => agent.id.clone(),
            other => panic!("expected AgentCreated, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn actor_creates_agent_and_node_together() {
        let handle = spawn(FlowState::new());

        let events = handle
            .send_command(Command::CreateAgent { position: None })
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, 1);
        match &events[0].payload {
            EventPayload::AgentCreated { agent, node } => {
                assert_eq!(agent.id, node.id);
                assert_eq!(agent.label, "New Agent");
                assert_eq!(node.position, Position { x: 100.0, y: 100.0 });
                assert!(node.is_agent());
            }
            other => panic!("expected AgentCreated, got {:?}", other),
        }

        let state = handle.read_state().await;
        assert_eq!(state.agents.len(), 1);
        assert_eq!(state.nodes.len(), 1);
    }

    #[tokio::test]
    async fn actor_update_of_unknown_agent_is_silent_noop() {
        let handle = spawn(FlowState::new());
        create_agent(&handle).await;
        let before = handle.document().await;

        let events = handle
            .send_command(Command::UpdateAgent {
                agent: Agent::new("ghost"),
            })
            .await
            .unwrap();

        assert!(events.is_empty());
        assert_eq!(handle.document().await, before);
    }

    #[tokio::test]
    async fn actor_delete_of_unknown_agent_is_silent_noop() {
        let handle = spawn(FlowState::new());

        let events = handle
            .send_command(Command::DeleteAgent {
                agent_id: "ghost".to_string(),
            })
            .await
            .unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn actor_connect_allows_parallel_edges_and_self_loops() {
        let handle = spawn(FlowState::new());
        let a = create_agent(&handle).await;
        let b = create_agent(&handle).await;

        for (source, target) in [(&a, &b), (&a, &b), (&a, &a)] {
            handle
                .send_command(Command::Connect {
                    source: source.clone(),
                    target: target.clone(),
                    source_handle: None,
                    target_handle: None,
                })
                .await
                .unwrap();
        }

        let state = handle.read_state().await;
        assert_eq!(state.edges.len(), 3);
    }

    #[tokio::test]
    async fn actor_rejects_connect_to_unknown_node() {
        let handle = spawn(FlowState::new());
        let a = create_agent(&handle).await;

        let err = handle
            .send_command(Command::Connect {
                source: a,
                target: "ghost".to_string(),
                source_handle: None,
                target_handle: None,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err, ActorError::NodeNotFound(ref id) if id == "ghost"),
            "expected NodeNotFound, got: {}",
            err
        );
    }

    #[tokio::test]
    async fn actor_remove_change_on_agent_node_deletes_agent() {
        let handle = spawn(FlowState::new());
        let a = create_agent(&handle).await;
        let b = create_agent(&handle).await;
        handle
            .send_command(Command::Connect {
                source: a.clone(),
                target: b.clone(),
                source_handle: None,
                target_handle: None,
            })
            .await
            .unwrap();

        let events = handle
            .send_command(Command::ApplyNodeChanges {
                changes: vec![NodeChange::Remove { id: a.clone() }],
            })
            .await
            .unwrap();

        assert!(matches!(
            &events[0].payload,
            EventPayload::AgentDeleted { agent_id } if *agent_id == a
        ));
        let state = handle.read_state().await;
        assert!(state.agent(&a).is_none());
        assert!(state.node(&a).is_none());
        assert!(state.edges.is_empty());
        assert!(state.agent(&b).is_some());
    }

    #[tokio::test]
    async fn actor_drag_moves_node_only() {
        let handle = spawn(FlowState::new());
        let a = create_agent(&handle).await;

        handle
            .send_command(Command::ApplyNodeChanges {
                changes: vec![
                    NodeChange::Position {
                        id: a.clone(),
                        position: Some(Position { x: 12.0, y: 34.0 }),
                        dragging: true,
                    },
                    NodeChange::Position {
                        id: "ghost".to_string(),
                        position: Some(Position { x: 1.0, y: 1.0 }),
                        dragging: true,
                    },
                ],
            })
            .await
            .unwrap();

        let state = handle.read_state().await;
        assert_eq!(state.node(&a).unwrap().position, Position { x: 12.0, y: 34.0 });
        assert_eq!(state.agent(&a).unwrap().label, "New Agent");
        assert_eq!(state.last_event_id, 2);
    }

    #[tokio::test]
    async fn actor_rejects_bare_agent_node() {
        let handle = spawn(FlowState::new());

        let err = handle
            .send_command(Command::AddNode {
                node: Node::agent("A9", Position::default()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ActorError::AgentNodeWithoutAgent(_)));
        assert!(handle.read_state().await.nodes.is_empty());
    }

    #[tokio::test]
    async fn actor_rejects_invalid_document_without_mutation() {
        let handle = spawn(FlowState::new());
        create_agent(&handle).await;
        let before = handle.document().await;

        let mut document = FlowDocument::default();
        document.agents.push(Agent::new("lonely"));

        let err = handle
            .send_command(Command::LoadFlow { document })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ActorError::InvalidDocument(DocumentError::AgentWithoutNode(_))
        ));
        assert_eq!(handle.document().await, before);
    }

    #[tokio::test]
    async fn actor_broadcasts_events() {
        let handle = spawn(FlowState::new());
        let mut rx = handle.subscribe();

        create_agent(&handle).await;

        let event = rx.recv().await.expect("should receive broadcast event");
        assert_eq!(event.event_id, 1);
        assert_eq!(event.payload.name(), "agent_created");
    }

    #[tokio::test]
    async fn actor_event_id_continues_from_restored_state() {
        let mut restored = FlowState::new();
        restored.last_event_id = 50;
        let handle = spawn(restored);

        let events = handle
            .send_command(Command::CreateAgent { position: None })
            .await
            .unwrap();

        assert_eq!(events[0].event_id, 51);
    }
}
