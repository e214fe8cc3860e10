// ABOUTME: Core library for agentflow, containing the agent/graph model, commands, and events.
// ABOUTME: FlowState is the single source of truth; the actor serializes every mutation through it.

pub mod actor;
pub mod changes;
pub mod command;
pub mod document;
pub mod editor;
pub mod event;
pub mod model;
pub mod panel;
pub mod state;

pub use actor::{ActorError, FlowActorHandle, spawn};
pub use changes::{Dimensions, EdgeChange, NodeChange};
pub use command::Command;
pub use document::{DocumentError, FlowDocument};
pub use editor::{EditorSession, NodeClick};
pub use event::{Event, EventPayload};
pub use model::{AGENT_NODE_TYPE, Agent, AgentData, Edge, Node, Parameter, ParameterType, Position, Tool};
pub use panel::{AgentDraft, AgentField, ParameterField, ToolField};
pub use state::FlowState;
