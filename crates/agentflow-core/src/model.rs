// ABOUTME: Defines the Agent, Tool, and Parameter records plus the visual Node and Edge types.
// ABOUTME: Agent nodes carry only an identifier and layout; their display data is resolved from the Agent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ulid::Ulid;

/// Node type tag used by the editor surface for agent nodes.
pub const AGENT_NODE_TYPE: &str = "agent";

/// Label given to freshly created agents.
pub const DEFAULT_AGENT_LABEL: &str = "New Agent";

/// Where new agent nodes are placed on the canvas.
pub const DEFAULT_NODE_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// The declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterType {
    #[default]
    String,
    Number,
    Boolean,
    Enum,
}

impl ParameterType {
    pub const ALL: [ParameterType; 4] = [
        ParameterType::String,
        ParameterType::Number,
        ParameterType::Boolean,
        ParameterType::Enum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::Number => "Number",
            ParameterType::Boolean => "Boolean",
            ParameterType::Enum => "Enum",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParameterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown parameter type: {}", s))
    }
}

/// A typed, named input declared by a tool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
}

/// A named capability attached to an agent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub url: String,
    pub parameters: Vec<Parameter>,
}

/// The editable fields of an agent, as shown on its canvas node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentData {
    pub label: String,
    pub description: String,
    /// Formatted text produced by the rich-text editor.
    pub steps: String,
    pub tools: Vec<Tool>,
}

/// One task-performing entity on the canvas.
///
/// Reads both the flat record and the node-shaped record older editor
/// versions wrote, where the fields sit under `data`. Flat fields win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AgentRecord")]
pub struct Agent {
    pub id: String,
    pub label: String,
    pub description: String,
    pub steps: String,
    pub tools: Vec<Tool>,
}

/// Wire shape accepted for an agent.
#[derive(Deserialize)]
struct AgentRecord {
    id: String,
    label: Option<String>,
    description: Option<String>,
    steps: Option<String>,
    tools: Option<Vec<Tool>>,
    #[serde(default)]
    data: AgentData,
}

impl From<AgentRecord> for Agent {
    fn from(record: AgentRecord) -> Self {
        let data = record.data;
        Self {
            id: record.id,
            label: record.label.unwrap_or(data.label),
            description: record.description.unwrap_or(data.description),
            steps: record.steps.unwrap_or(data.steps),
            tools: record.tools.unwrap_or(data.tools),
        }
    }
}

impl Agent {
    /// Create an agent with default fields under the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: DEFAULT_AGENT_LABEL.to_string(),
            description: String::new(),
            steps: String::new(),
            tools: Vec::new(),
        }
    }

    /// Create a default agent under a freshly generated ULID.
    pub fn generate() -> Self {
        Self::new(Ulid::new().to_string())
    }

    /// Whether every editable field is empty.
    pub fn is_blank(&self) -> bool {
        self.label.is_empty()
            && self.description.is_empty()
            && self.steps.is_empty()
            && self.tools.is_empty()
    }

    pub fn data(&self) -> AgentData {
        AgentData {
            label: self.label.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
            tools: self.tools.clone(),
        }
    }
}

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A visual node on the canvas.
///
/// For agent nodes `data` is always null inside the flow state; the document
/// layer fills it from the matching agent on export. Non-agent nodes keep
/// whatever data they were created or imported with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Value,
    /// Editor-surface fields (width, height, selected, ...) kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// An agent node at the given position.
    pub fn agent(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type: AGENT_NODE_TYPE.to_string(),
            position,
            data: Value::Null,
            extra: Map::new(),
        }
    }

    pub fn is_agent(&self) -> bool {
        self.node_type == AGENT_NODE_TYPE
    }
}

/// A visual connection between two nodes. Carries no meaning beyond display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Edge {
    /// A new edge between two nodes under a freshly generated identifier.
    /// Parallel edges and self-loops are allowed, so the id never derives
    /// from the endpoints.
    pub fn connect(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Self {
        Self {
            id: format!("edge-{}", Ulid::new()),
            source: source.into(),
            target: target.into(),
            source_handle,
            target_handle,
            extra: Map::new(),
        }
    }

    /// Whether either endpoint is the given node.
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_new_sets_defaults() {
        let agent = Agent::new("A1");

        assert_eq!(agent.id, "A1");
        assert_eq!(agent.label, "New Agent");
        assert!(agent.description.is_empty());
        assert!(agent.steps.is_empty());
        assert!(agent.tools.is_empty());
    }

    #[test]
    fn agent_generate_produces_distinct_ids() {
        let a = Agent::generate();
        let b = Agent::generate();

        assert_ne!(a.id, b.id);
        assert!(a.id.parse::<Ulid>().is_ok());
    }

    #[test]
    fn tool_fills_missing_fields_from_json() {
        let tool: Tool = serde_json::from_value(serde_json::json!({
            "name": "lookup",
            "parameters": [{ "name": "q", "type": "String" }]
        }))
        .unwrap();

        assert_eq!(tool.name, "lookup");
        assert_eq!(tool.description, "");
        assert_eq!(tool.url, "");
        assert_eq!(tool.parameters.len(), 1);
        assert_eq!(tool.parameters[0].param_type, ParameterType::String);
        assert_eq!(tool.parameters[0].description, "");
    }

    #[test]
    fn parameter_type_serializes_as_plain_name() {
        let param = Parameter {
            name: "flag".to_string(),
            param_type: ParameterType::Boolean,
            description: String::new(),
        };
        let json = serde_json::to_value(&param).unwrap();

        assert_eq!(json["type"], "Boolean");
        assert_eq!("Enum".parse::<ParameterType>().unwrap(), ParameterType::Enum);
        assert!("Text".parse::<ParameterType>().is_err());
    }

    #[test]
    fn node_keeps_editor_fields() {
        let json = serde_json::json!({
            "id": "n1",
            "type": "agent",
            "position": { "x": 10.0, "y": 20.0 },
            "data": { "label": "Router" },
            "width": 150,
            "height": 40,
            "selected": false
        });
        let node: Node = serde_json::from_value(json.clone()).unwrap();

        assert!(node.is_agent());
        assert_eq!(node.extra["width"], 150);
        assert_eq!(serde_json::to_value(&node).unwrap(), json);
    }

    #[test]
    fn edge_uses_camel_case_handles() {
        let edge: Edge = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "source": "a",
            "target": "b",
            "sourceHandle": "out"
        }))
        .unwrap();

        assert_eq!(edge.source_handle.as_deref(), Some("out"));
        assert!(edge.target_handle.is_none());
        assert!(edge.touches("a"));
        assert!(edge.touches("b"));
        assert!(!edge.touches("c"));
    }

    #[test]
    fn edge_keeps_null_handles_on_write() {
        let json = serde_json::json!({
            "id": "reactflow__edge-a-b",
            "source": "a",
            "target": "b",
            "sourceHandle": null,
            "targetHandle": null
        });
        let edge: Edge = serde_json::from_value(json.clone()).unwrap();

        assert_eq!(serde_json::to_value(&edge).unwrap(), json);
    }

    #[test]
    fn agent_reads_node_shaped_record() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "type": "agent",
            "position": { "x": 0.0, "y": 0.0 },
            "data": {
                "label": "Router",
                "description": "routes",
                "steps": "1. route",
                "tools": [{ "name": "lookup" }]
            }
        }))
        .unwrap();

        assert_eq!(agent.id, "a1");
        assert_eq!(agent.label, "Router");
        assert_eq!(agent.description, "routes");
        assert_eq!(agent.steps, "1. route");
        assert_eq!(agent.tools[0].name, "lookup");
        assert!(!agent.is_blank());
    }

    #[test]
    fn agent_flat_fields_win_over_data() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "label": "Flat",
            "data": { "label": "Nested", "steps": "nested steps" }
        }))
        .unwrap();

        assert_eq!(agent.label, "Flat");
        assert_eq!(agent.steps, "nested steps");
    }

    #[test]
    fn connect_allows_parallel_edges() {
        let first = Edge::connect("a", "b", None, None);
        let second = Edge::connect("a", "b", None, None);

        assert_ne!(first.id, second.id);
    }
}
