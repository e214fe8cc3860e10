// ABOUTME: AgentDraft, the working copy edited by the detail panel before it is committed.
// ABOUTME: Covers label/description/steps edits and the nested tool and parameter list operations.

use std::str::FromStr;

use crate::model::{Agent, Parameter, ParameterType, Tool};

/// Top-level text fields of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentField {
    Label,
    Description,
    Steps,
}

impl FromStr for AgentField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(AgentField::Label),
            "description" => Ok(AgentField::Description),
            "steps" => Ok(AgentField::Steps),
            other => Err(format!("unknown agent field: {}", other)),
        }
    }
}

/// Editable fields of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolField {
    Name,
    Description,
    Url,
}

impl FromStr for ToolField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ToolField::Name),
            "description" => Ok(ToolField::Description),
            "url" => Ok(ToolField::Url),
            other => Err(format!("unknown tool field: {}", other)),
        }
    }
}

/// Editable fields of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterField {
    Name,
    Type,
    Description,
}

impl FromStr for ParameterField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(ParameterField::Name),
            "type" => Ok(ParameterField::Type),
            "description" => Ok(ParameterField::Description),
            other => Err(format!("unknown parameter field: {}", other)),
        }
    }
}

/// A working copy of one agent. Nothing here touches the flow until the
/// draft is turned back into an [`Agent`] and committed.
///
/// Every edit returns whether it applied; out-of-range indices and
/// unknown parameter types leave the draft as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDraft {
    agent_id: String,
    pub label: String,
    pub description: String,
    pub steps: String,
    pub tools: Vec<Tool>,
}

impl AgentDraft {
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            agent_id: agent.id.clone(),
            label: agent.label.clone(),
            description: agent.description.clone(),
            steps: agent.steps.clone(),
            tools: agent.tools.clone(),
        }
    }

    /// Identifier of the agent this draft is bound to.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn set_field(&mut self, field: AgentField, value: String) {
        match field {
            AgentField::Label => self.label = value,
            AgentField::Description => self.description = value,
            AgentField::Steps => self.steps = value,
        }
    }

    /// Append an empty tool.
    pub fn add_tool(&mut self) {
        self.tools.push(Tool::default());
    }

    pub fn update_tool(&mut self, index: usize, field: ToolField, value: String) -> bool {
        let Some(tool) = self.tools.get_mut(index) else {
            return false;
        };
        match field {
            ToolField::Name => tool.name = value,
            ToolField::Description => tool.description = value,
            ToolField::Url => tool.url = value,
        }
        true
    }

    pub fn remove_tool(&mut self, index: usize) -> bool {
        if index >= self.tools.len() {
            return false;
        }
        self.tools.remove(index);
        true
    }

    /// Append an empty `String` parameter to the given tool.
    pub fn add_parameter(&mut self, tool_index: usize) -> bool {
        let Some(tool) = self.tools.get_mut(tool_index) else {
            return false;
        };
        tool.parameters.push(Parameter::default());
        true
    }

    pub fn update_parameter(
        &mut self,
        tool_index: usize,
        param_index: usize,
        field: ParameterField,
        value: String,
    ) -> bool {
        let Some(param) = self
            .tools
            .get_mut(tool_index)
            .and_then(|t| t.parameters.get_mut(param_index))
        else {
            return false;
        };
        match field {
            ParameterField::Name => param.name = value,
            ParameterField::Description => param.description = value,
            ParameterField::Type => match value.parse::<ParameterType>() {
                Ok(param_type) => param.param_type = param_type,
                Err(e) => {
                    tracing::debug!("rejecting parameter edit: {}", e);
                    return false;
                }
            },
        }
        true
    }

    pub fn remove_parameter(&mut self, tool_index: usize, param_index: usize) -> bool {
        match self.tools.get_mut(tool_index) {
            Some(tool) if param_index < tool.parameters.len() => {
                tool.parameters.remove(param_index);
                true
            }
            _ => false,
        }
    }

    /// The complete agent record this draft describes.
    pub fn to_agent(&self) -> Agent {
        Agent {
            id: self.agent_id.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            steps: self.steps.clone(),
            tools: self.tools.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AgentDraft {
        AgentDraft::from_agent(&Agent::new("A1"))
    }

    #[test]
    fn draft_starts_from_agent_fields() {
        let mut agent = Agent::new("A1");
        agent.description = "routes requests".to_string();
        let draft = AgentDraft::from_agent(&agent);

        assert_eq!(draft.agent_id(), "A1");
        assert_eq!(draft.label, "New Agent");
        assert_eq!(draft.to_agent(), agent);
    }

    #[test]
    fn add_tool_appends_empty_tool() {
        let mut d = draft();
        d.add_tool();

        assert_eq!(d.tools.len(), 1);
        assert_eq!(d.tools[0], Tool::default());
        assert!(d.tools[0].parameters.is_empty());
    }

    #[test]
    fn tool_edits_target_one_index() {
        let mut d = draft();
        d.add_tool();
        d.add_tool();

        assert!(d.update_tool(1, ToolField::Name, "lookup".to_string()));
        assert!(d.update_tool(1, ToolField::Url, "https://example.com/q".to_string()));
        assert!(!d.update_tool(5, ToolField::Name, "nope".to_string()));

        assert_eq!(d.tools[0].name, "");
        assert_eq!(d.tools[1].name, "lookup");
        assert_eq!(d.tools[1].url, "https://example.com/q");
    }

    #[test]
    fn remove_tool_keeps_order_of_the_rest() {
        let mut d = draft();
        for name in ["a", "b", "c"] {
            d.add_tool();
            let last = d.tools.len() - 1;
            d.update_tool(last, ToolField::Name, name.to_string());
        }

        assert!(d.remove_tool(1));
        assert!(!d.remove_tool(9));

        let names: Vec<_> = d.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn parameters_default_to_string_type() {
        let mut d = draft();
        d.add_tool();

        assert!(d.add_parameter(0));
        assert!(!d.add_parameter(3));

        let param = &d.tools[0].parameters[0];
        assert_eq!(param.name, "");
        assert_eq!(param.param_type, ParameterType::String);
        assert_eq!(param.description, "");
    }

    #[test]
    fn parameter_type_edit_rejects_unknown_names() {
        let mut d = draft();
        d.add_tool();
        d.add_parameter(0);

        assert!(d.update_parameter(0, 0, ParameterField::Type, "Number".to_string()));
        assert!(!d.update_parameter(0, 0, ParameterField::Type, "Float".to_string()));
        assert!(!d.update_parameter(0, 4, ParameterField::Name, "x".to_string()));

        assert_eq!(d.tools[0].parameters[0].param_type, ParameterType::Number);
    }

    #[test]
    fn remove_parameter_by_index() {
        let mut d = draft();
        d.add_tool();
        d.add_parameter(0);
        d.add_parameter(0);
        d.update_parameter(0, 1, ParameterField::Name, "keep".to_string());

        assert!(d.remove_parameter(0, 0));
        assert!(!d.remove_parameter(0, 5));
        assert!(!d.remove_parameter(2, 0));

        assert_eq!(d.tools[0].parameters.len(), 1);
        assert_eq!(d.tools[0].parameters[0].name, "keep");
    }

    #[test]
    fn field_names_parse() {
        assert_eq!("steps".parse::<AgentField>().unwrap(), AgentField::Steps);
        assert_eq!("url".parse::<ToolField>().unwrap(), ToolField::Url);
        assert_eq!("type".parse::<ParameterField>().unwrap(), ParameterField::Type);
        assert!("colour".parse::<ToolField>().is_err());
    }
}
