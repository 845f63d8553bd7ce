use serde_json::{Map, Value};

use crate::models::{Tool, ThoughtData, SEQUENTIAL_THINKING_TOOL_NAME};

/// Description shown to clients for the built-in tool
pub const SEQUENTIAL_THINKING_DESCRIPTION: &str = "A detailed tool for dynamic and reflective problem-solving through thoughts. \
Each thought can build on, question, or revise previous insights as understanding deepens, and can branch into alternative lines of reasoning. \
For every step, recommend which available MCP tools to use next, with a priority, a rationale, alternatives and suggested inputs. \
The server only tracks the reasoning and the recommendations; executing the recommended tools is up to the client. \
Set next_thought_needed to false only when the problem is solved and no further steps are required.";

/// Result of registering a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Inserted,
    /// A tool with the same name already exists; the first one is kept
    Duplicate,
}

/// Tools known to the server, in registration order
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Registry holding the built-in tool followed by `extras`
    pub fn with_builtin(extras: impl IntoIterator<Item = Tool>) -> Self {
        let mut registry = Self { tools: Vec::new() };
        for tool in std::iter::once(sequential_thinking_tool()).chain(extras) {
            registry.add(tool);
        }
        tracing::info!("Available tools: {:?}", registry.names());
        registry
    }

    /// Register a tool unless one with the same name already exists
    pub fn add(&mut self, tool: Tool) -> RegisterOutcome {
        if self.get(&tool.name).is_some() {
            tracing::warn!("Tool '{}' already exists, keeping first occurrence", tool.name);
            return RegisterOutcome::Duplicate;
        }
        tracing::debug!("Added tool: {}", tool.name);
        self.tools.push(tool);
        RegisterOutcome::Inserted
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtin(Vec::new())
    }
}

/// Descriptor of the built-in `sequentialthinking_tools` tool
pub fn sequential_thinking_tool() -> Tool {
    let schema = serde_json::to_value(schemars::schema_for!(ThoughtData)).unwrap_or(Value::Null);
    let input_schema = match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Tool {
        name: SEQUENTIAL_THINKING_TOOL_NAME.to_string(),
        description: SEQUENTIAL_THINKING_DESCRIPTION.to_string(),
        input_schema,
    }
}
