// ABOUTME: Defines FlowState, the single source of truth for agents, nodes, and edges.
// ABOUTME: The apply() method folds events; agent node display data is resolved from agents on demand.

use serde_json::Value;

use crate::document::FlowDocument;
use crate::event::{Event, EventPayload};
use crate::model::{Agent, Edge, Node};

/// The full materialized state of the flow.
///
/// Agents and agent nodes always come and go in pairs: every mutation that
/// adds or removes one touches the other inside the same `apply` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowState {
    pub agents: Vec<Agent>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub last_event_id: u64,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load agents, nodes, and edges from a validated document.
    /// Copies of agent fields inside agent node data are dropped.
    pub fn from_document(document: FlowDocument) -> Self {
        let nodes = document
            .nodes
            .into_iter()
            .map(|mut node| {
                if node.is_agent() {
                    node.data = Value::Null;
                }
                node
            })
            .collect();

        Self {
            agents: document.agents,
            nodes,
            edges: document.edges,
            last_event_id: 0,
        }
    }

    /// Build the persisted/exported document, filling each agent node's
    /// data from its agent.
    pub fn to_document(&self) -> FlowDocument {
        let nodes = self
            .nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                node.data = self.node_data(&node);
                node
            })
            .collect();

        FlowDocument {
            agents: self.agents.clone(),
            nodes,
            edges: self.edges.clone(),
        }
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Display data for a node: the matching agent's fields for agent
    /// nodes, the node's own data otherwise.
    pub fn node_data(&self, node: &Node) -> Value {
        if !node.is_agent() {
            return node.data.clone();
        }
        match self.agent(&node.id) {
            Some(agent) => serde_json::to_value(agent.data()).unwrap_or(Value::Null),
            None => Value::Null,
        }
    }

    /// Apply a single event. Events naming an unknown agent, node, or edge
    /// leave the state untouched.
    pub fn apply(&mut self, event: &Event) {
        self.last_event_id = event.event_id;

        match &event.payload {
            EventPayload::AgentCreated { agent, node } => {
                self.agents.push(agent.clone());
                self.nodes.push(node.clone());
            }

            EventPayload::AgentUpdated { agent } => {
                if let Some(existing) = self.agents.iter_mut().find(|a| a.id == agent.id) {
                    *existing = agent.clone();
                }
            }

            EventPayload::AgentDeleted { agent_id } => {
                self.agents.retain(|a| a.id != *agent_id);
                self.remove_node(agent_id);
            }

            EventPayload::NodeAdded { node } => {
                self.nodes.push(node.clone());
            }

            EventPayload::NodeMoved {
                node_id,
                position,
                dragging,
            } => {
                if let Some(node) = self.node_mut(node_id) {
                    if let Some(p) = position {
                        node.position = *p;
                    }
                    node.extra.insert("dragging".to_string(), Value::Bool(*dragging));
                }
            }

            EventPayload::NodeResized {
                node_id,
                dimensions,
            } => {
                if let Some(node) = self.node_mut(node_id) {
                    node.extra
                        .insert("width".to_string(), serde_json::json!(dimensions.width));
                    node.extra
                        .insert("height".to_string(), serde_json::json!(dimensions.height));
                }
            }

            EventPayload::NodeSelected { node_id, selected } => {
                if let Some(node) = self.node_mut(node_id) {
                    node.extra.insert("selected".to_string(), Value::Bool(*selected));
                }
            }

            EventPayload::NodeRemoved { node_id } => {
                // Agent nodes never outlive their agent
                if self.node(node_id).is_some_and(Node::is_agent) {
                    self.agents.retain(|a| a.id != *node_id);
                }
                self.remove_node(node_id);
            }

            EventPayload::EdgeAdded { edge } => {
                self.edges.push(edge.clone());
            }

            EventPayload::EdgeSelected { edge_id, selected } => {
                if let Some(edge) = self.edges.iter_mut().find(|e| e.id == *edge_id) {
                    edge.extra.insert("selected".to_string(), Value::Bool(*selected));
                }
            }

            EventPayload::EdgeRemoved { edge_id } => {
                self.edges.retain(|e| e.id != *edge_id);
            }

            EventPayload::FlowLoaded { document } => {
                let last_event_id = self.last_event_id;
                *self = FlowState::from_document(document.clone());
                self.last_event_id = last_event_id;
            }
        }
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Remove a node and prune every edge that touches it.
    fn remove_node(&mut self, node_id: &str) {
        self.nodes.retain(|n| n.id != node_id);
        self.edges.retain(|e| !e.touches(node_id));
    }
}
