// ABOUTME: Web UI route handlers serving HTML via Askama templates and HTMX.
// ABOUTME: Renders the canvas node list and the agent detail panel, whose edits stay in a draft until submitted.

use agentflow_core::{
    AgentDraft, AgentField, Command, FlowState, NodeClick, ParameterField, ParameterType,
    ToolField,
};
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use crate::app_state::SharedState;

use askama::Template;
use askama_derive_axum::IntoResponse as AskamaIntoResponse;

/// Event name HTMX listens for to reload the canvas after a flow change.
const FLOW_CHANGED_TRIGGER: &str = "flow-changed";

/// The editor page: canvas on the left, detail panel on the right.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

/// GET / - Render the editor page.
pub async fn index() -> IndexTemplate {
    IndexTemplate {}
}

/// One node as drawn on the canvas.
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub description: String,
    pub is_agent: bool,
    pub x: f64,
    pub y: f64,
}

/// Partial: every node of the flow, positioned on the canvas.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "partials/agent_list.html")]
pub struct AgentListTemplate {
    pub nodes: Vec<NodeView>,
    pub edge_count: usize,
}

impl AgentListTemplate {
    fn from_flow(flow: &FlowState) -> Self {
        let nodes = flow
            .nodes
            .iter()
            .map(|node| {
                let data = flow.node_data(node);
                let text = |key: &str| {
                    data.get(key)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string()
                };
                NodeView {
                    id: node.id.clone(),
                    label: text("label"),
                    description: text("description"),
                    is_agent: node.is_agent(),
                    x: node.position.x,
                    y: node.position.y,
                }
            })
            .collect();

        Self {
            nodes,
            edge_count: flow.edges.len(),
        }
    }
}

/// GET /web/agents - The canvas node list as an HTML partial.
pub async fn agent_list(State(state): State<SharedState>) -> impl IntoResponse {
    let flow = state.actor.read_state().await;
    AgentListTemplate::from_flow(&flow)
}

/// POST /web/agents - Create an agent at the default position, return the node list.
pub async fn create_agent(State(state): State<SharedState>) -> Response {
    if let Err(e) = state.dispatch(Command::CreateAgent { position: None }).await {
        tracing::error!("failed to create agent: {}", e);
        return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create agent.");
    }
    let flow = state.actor.read_state().await;
    AgentListTemplate::from_flow(&flow).into_response()
}

/// POST /web/agents/{id}/delete - Corner delete control on an agent node.
/// Returns the node list and tells the panel to refresh.
pub async fn delete_agent(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    if let Err(e) = state.dispatch(Command::DeleteAgent { agent_id: id }).await {
        tracing::error!("failed to delete agent: {}", e);
        return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete agent.");
    }
    let flow = state.actor.read_state().await;
    (
        [("HX-Trigger", FLOW_CHANGED_TRIGGER)],
        AgentListTemplate::from_flow(&flow),
    )
        .into_response()
}

/// A parameter type choice in the panel's select box.
pub struct TypeOption {
    pub value: &'static str,
    pub selected: bool,
}

pub struct ParameterView {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub types: Vec<TypeOption>,
}

pub struct ToolView {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub url: String,
    pub parameters: Vec<ParameterView>,
}

/// The open draft, flattened for rendering.
pub struct PanelView {
    pub agent_id: String,
    pub label: String,
    pub description: String,
    pub steps: String,
    pub tools: Vec<ToolView>,
}

impl PanelView {
    fn from_draft(draft: &AgentDraft) -> Self {
        let tools = draft
            .tools
            .iter()
            .enumerate()
            .map(|(index, tool)| ToolView {
                index,
                name: tool.name.clone(),
                description: tool.description.clone(),
                url: tool.url.clone(),
                parameters: tool
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(index, param)| ParameterView {
                        index,
                        name: param.name.clone(),
                        description: param.description.clone(),
                        types: ParameterType::ALL
                            .iter()
                            .map(|t| TypeOption {
                                value: t.as_str(),
                                selected: *t == param.param_type,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            agent_id: draft.agent_id().to_string(),
            label: draft.label.clone(),
            description: draft.description.clone(),
            steps: draft.steps.clone(),
            tools,
        }
    }
}

/// Partial: the detail panel, empty when no agent is open.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "partials/panel.html")]
pub struct PanelTemplate {
    pub panel: Option<PanelView>,
}

impl PanelTemplate {
    fn from_draft(draft: Option<&AgentDraft>) -> Self {
        Self {
            panel: draft.map(PanelView::from_draft),
        }
    }
}

/// GET /web/panel - The detail panel as it currently stands.
pub async fn panel(State(state): State<SharedState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    PanelTemplate::from_draft(session.panel())
}

/// POST /web/nodes/{id}/click - Open the panel when the click lands in an
/// agent node's header. Any other click leaves the panel as it was.
pub async fn click_node(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Form(click): Form<NodeClick>,
) -> impl IntoResponse {
    let flow = state.actor.read_state().await;
    let mut session = state.session.lock().await;
    session.click_node(&flow, &id, click);
    PanelTemplate::from_draft(session.panel())
}

/// POST /web/panel/close - Discard the draft.
pub async fn close_panel(State(state): State<SharedState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    session.close();
    PanelTemplate { panel: None }
}

/// POST /web/panel/submit - Write the draft back to the flow and close the panel.
pub async fn submit_panel(State(state): State<SharedState>) -> Response {
    // Release the session before dispatching; dispatch locks it again.
    let cmd = state.session.lock().await.commit();
    let Some(cmd) = cmd else {
        return no_open_panel();
    };

    if let Err(e) = state.dispatch(cmd).await {
        tracing::error!("failed to submit agent draft: {}", e);
        return error_fragment(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save agent.");
    }

    (
        [("HX-Trigger", FLOW_CHANGED_TRIGGER)],
        PanelTemplate { panel: None },
    )
        .into_response()
}

/// Form data for a single field edit.
#[derive(Debug, Deserialize)]
pub struct ValueForm {
    #[serde(default)]
    pub value: String,
}

/// POST /web/panel/fields/{field} - Edit label, description, or steps.
/// The panel is not re-rendered so the input keeps focus.
pub async fn update_field(
    State(state): State<SharedState>,
    Path(field): Path<String>,
    Form(form): Form<ValueForm>,
) -> Response {
    let Ok(field) = field.parse::<AgentField>() else {
        return error_fragment(StatusCode::BAD_REQUEST, "Unknown field.");
    };

    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    draft.set_field(field, form.value);
    StatusCode::NO_CONTENT.into_response()
}

/// POST /web/panel/tools - Append an empty tool and re-render the panel.
pub async fn add_tool(State(state): State<SharedState>) -> Response {
    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    draft.add_tool();
    PanelTemplate::from_draft(session.panel()).into_response()
}

/// POST /web/panel/tools/{tool}/fields/{field} - Edit a tool's name, description, or url.
pub async fn update_tool(
    State(state): State<SharedState>,
    Path((tool, field)): Path<(usize, String)>,
    Form(form): Form<ValueForm>,
) -> Response {
    let Ok(field) = field.parse::<ToolField>() else {
        return error_fragment(StatusCode::BAD_REQUEST, "Unknown field.");
    };

    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    if draft.update_tool(tool, field, form.value) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_fragment(StatusCode::NOT_FOUND, "No such tool.")
    }
}

/// POST /web/panel/tools/{tool}/remove - Remove a tool and re-render the panel.
pub async fn remove_tool(State(state): State<SharedState>, Path(tool): Path<usize>) -> Response {
    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    draft.remove_tool(tool);
    PanelTemplate::from_draft(session.panel()).into_response()
}

/// POST /web/panel/tools/{tool}/parameters - Append an empty parameter to a tool.
pub async fn add_parameter(State(state): State<SharedState>, Path(tool): Path<usize>) -> Response {
    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    draft.add_parameter(tool);
    PanelTemplate::from_draft(session.panel()).into_response()
}

/// POST /web/panel/tools/{tool}/parameters/{param}/fields/{field} - Edit a
/// parameter's name, type, or description.
pub async fn update_parameter(
    State(state): State<SharedState>,
    Path((tool, param, field)): Path<(usize, usize, String)>,
    Form(form): Form<ValueForm>,
) -> Response {
    let Ok(field) = field.parse::<ParameterField>() else {
        return error_fragment(StatusCode::BAD_REQUEST, "Unknown field.");
    };

    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    if draft.update_parameter(tool, param, field, form.value) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_fragment(StatusCode::BAD_REQUEST, "Parameter edit rejected.")
    }
}

/// POST /web/panel/tools/{tool}/parameters/{param}/remove - Remove a parameter.
pub async fn remove_parameter(
    State(state): State<SharedState>,
    Path((tool, param)): Path<(usize, usize)>,
) -> Response {
    let mut session = state.session.lock().await;
    let Some(draft) = session.panel_mut() else {
        return no_open_panel();
    };
    draft.remove_parameter(tool, param);
    PanelTemplate::from_draft(session.panel()).into_response()
}

fn no_open_panel() -> Response {
    error_fragment(StatusCode::NOT_FOUND, "No agent is open in the panel.")
}

fn error_fragment(status: StatusCode, message: &str) -> Response {
    (status, Html(format!("<p class=\"error-msg\">{}</p>", message))).into_response()
}
