// ABOUTME: Defines the event envelope and all event payload variants for the flow.
// ABOUTME: Events are the facts FlowState folds; they are also what the SSE stream publishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::changes::Dimensions;
use crate::document::FlowDocument;
use crate::model::{Agent, Edge, Node, Position};

/// An event envelope wrapping a timestamped, sequenced payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

/// The set of things that can happen to a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// The agent and its node share one identifier and land together.
    AgentCreated {
        agent: Agent,
        node: Node,
    },
    AgentUpdated {
        agent: Agent,
    },
    /// Removes the agent, its node, and every edge touching the node.
    AgentDeleted {
        agent_id: String,
    },
    NodeAdded {
        node: Node,
    },
    NodeMoved {
        node_id: String,
        position: Option<Position>,
        dragging: bool,
    },
    NodeResized {
        node_id: String,
        dimensions: Dimensions,
    },
    NodeSelected {
        node_id: String,
        selected: bool,
    },
    /// Removal of a non-agent node and its edges.
    NodeRemoved {
        node_id: String,
    },
    EdgeAdded {
        edge: Edge,
    },
    EdgeSelected {
        edge_id: String,
        selected: bool,
    },
    EdgeRemoved {
        edge_id: String,
    },
    FlowLoaded {
        document: FlowDocument,
    },
}

impl EventPayload {
    /// Snake-case name of the variant, used as the SSE event type.
    pub fn name(&self) -> &'static str {
        match self {
            EventPayload::AgentCreated { .. } => "agent_created",
            EventPayload::AgentUpdated { .. } => "agent_updated",
            EventPayload::AgentDeleted { .. } => "agent_deleted",
            EventPayload::NodeAdded { .. } => "node_added",
            EventPayload::NodeMoved { .. } => "node_moved",
            EventPayload::NodeResized { .. } => "node_resized",
            EventPayload::NodeSelected { .. } => "node_selected",
            EventPayload::NodeRemoved { .. } => "node_removed",
            EventPayload::EdgeAdded { .. } => "edge_added",
            EventPayload::EdgeSelected { .. } => "edge_selected",
            EventPayload::EdgeRemoved { .. } => "edge_removed",
            EventPayload::FlowLoaded { .. } => "flow_loaded",
        }
    }
}
