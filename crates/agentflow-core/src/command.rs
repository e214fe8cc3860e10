// ABOUTME: Defines the Command enum representing every mutation the editor can request.
// ABOUTME: Commands are intent-based inputs that the flow actor validates and converts into events.

use serde::{Deserialize, Serialize};

use crate::changes::{EdgeChange, NodeChange};
use crate::document::FlowDocument;
use crate::model::{Agent, Node, Position};

/// A typed mutation of the flow. Each command is handled as one unit: all
/// resulting events are applied before the next command is looked at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Create an agent and its node under one new identifier.
    CreateAgent {
        #[serde(default)]
        position: Option<Position>,
    },
    /// Replace an agent's editable fields with a complete record.
    UpdateAgent {
        agent: Agent,
    },
    /// Delete an agent, its node, and every edge touching the node.
    DeleteAgent {
        agent_id: String,
    },
    /// Add a non-agent node. Agent nodes only come from CreateAgent.
    AddNode {
        node: Node,
    },
    ApplyNodeChanges {
        changes: Vec<NodeChange>,
    },
    ApplyEdgeChanges {
        changes: Vec<EdgeChange>,
    },
    Connect {
        source: String,
        target: String,
        #[serde(default)]
        source_handle: Option<String>,
        #[serde(default)]
        target_handle: Option<String>,
    },
    /// Replace agents, nodes, and edges with a validated document.
    LoadFlow {
        document: FlowDocument,
    },
}
