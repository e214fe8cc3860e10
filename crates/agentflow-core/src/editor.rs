// ABOUTME: Editor session state: node-click hit testing and the single open detail-panel draft.
// ABOUTME: Selecting, closing, committing, and delete-driven closing of the panel live here.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::panel::AgentDraft;
use crate::state::FlowState;

/// Share of a node's height, from the top, that opens the detail panel.
/// The rest is left for the corner delete control.
pub const HEADER_FRACTION: f64 = 0.8;

/// Pointer position of a click relative to the clicked node element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeClick {
    pub offset_y: f64,
    pub height: f64,
}

impl NodeClick {
    pub fn hits_header(&self) -> bool {
        self.offset_y <= self.height * HEADER_FRACTION
    }
}

/// Per-client editing state. At most one agent is open in the panel.
#[derive(Debug, Default)]
pub struct EditorSession {
    draft: Option<AgentDraft>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on a node. Opens the panel bound to the matching agent
    /// when the click lands in the header of an agent node; anything else
    /// leaves the session as it was. Returns whether the panel was opened.
    pub fn click_node(&mut self, state: &FlowState, node_id: &str, click: NodeClick) -> bool {
        let Some(node) = state.node(node_id) else {
            return false;
        };
        if !node.is_agent() || !click.hits_header() {
            return false;
        }
        let Some(agent) = state.agent(node_id) else {
            return false;
        };

        tracing::debug!(agent_id = %agent.id, "opening detail panel");
        self.draft = Some(AgentDraft::from_agent(agent));
        true
    }

    pub fn panel(&self) -> Option<&AgentDraft> {
        self.draft.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut AgentDraft> {
        self.draft.as_mut()
    }

    pub fn close(&mut self) {
        self.draft = None;
    }

    /// Close the panel and hand back the update it describes.
    pub fn commit(&mut self) -> Option<Command> {
        let draft = self.draft.take()?;
        Some(Command::UpdateAgent {
            agent: draft.to_agent(),
        })
    }

    /// Close the panel if it is bound to the given agent.
    pub fn forget_agent(&mut self, agent_id: &str) {
        if self.draft.as_ref().is_some_and(|d| d.agent_id() == agent_id) {
            self.draft = None;
        }
    }
}
