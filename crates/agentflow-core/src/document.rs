// ABOUTME: The persisted/exported flow document {agents, nodes, edges} and its boundary validation.
// ABOUTME: Parsed documents are checked for agent/node pairing before they may replace any state.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Agent, AgentData, Edge, Node};

/// Errors raised while turning untrusted text into a flow document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid flow document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    #[error("agent node {0} has no matching agent")]
    NodeWithoutAgent(String),

    #[error("agent {0} has no matching agent node")]
    AgentWithoutNode(String),
}

/// The unit written to local storage and to `flow.json`.
///
/// Agent nodes in a document carry a copy of their agent's fields in `data`;
/// on load that copy is discarded and the `agents` list is authoritative.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowDocument {
    /// Parse and validate a document from JSON text.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let document: FlowDocument = serde_json::from_str(text)?;
        document.validate()
    }

    /// Check the agent/node pairing and drop edges whose endpoints are not
    /// nodes of this document. An agent record with no fields of its own
    /// takes them from its node's `data`.
    pub fn validate(mut self) -> Result<Self, DocumentError> {
        self.fill_blank_agents();

        let mut agent_ids = HashSet::new();
        for agent in &self.agents {
            if !agent_ids.insert(agent.id.as_str()) {
                return Err(DocumentError::DuplicateAgent(agent.id.clone()));
            }
        }

        let mut node_ids = HashSet::new();
        let mut agent_node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(DocumentError::DuplicateNode(node.id.clone()));
            }
            if node.is_agent() {
                if !agent_ids.contains(node.id.as_str()) {
                    return Err(DocumentError::NodeWithoutAgent(node.id.clone()));
                }
                agent_node_ids.insert(node.id.as_str());
            }
        }

        if let Some(orphan) = self
            .agents
            .iter()
            .find(|a| !agent_node_ids.contains(a.id.as_str()))
        {
            return Err(DocumentError::AgentWithoutNode(orphan.id.clone()));
        }

        let before = self.edges.len();
        self.edges
            .retain(|e| node_ids.contains(e.source.as_str()) && node_ids.contains(e.target.as_str()));
        if self.edges.len() != before {
            tracing::warn!(
                "dropped {} edge(s) with unknown endpoints",
                before - self.edges.len()
            );
        }

        Ok(self)
    }

    fn fill_blank_agents(&mut self) {
        for agent in self.agents.iter_mut().filter(|a| a.is_blank()) {
            let Some(node) = self.nodes.iter().find(|n| n.id == agent.id && n.is_agent()) else {
                continue;
            };
            let Ok(data) = serde_json::from_value::<AgentData>(node.data.clone()) else {
                continue;
            };
            if data == AgentData::default() {
                continue;
            }
            tracing::debug!(agent_id = %agent.id, "filled agent from its node data");
            agent.label = data.label;
            agent.description = data.description;
            agent.steps = data.steps;
            agent.tools = data.tools;
        }
    }

    /// Serialize as compact JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
