use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Name of the built-in tool this server exposes
pub const SEQUENTIAL_THINKING_TOOL_NAME: &str = "sequentialthinking_tools";

/// A single reasoning step submitted by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ThoughtData {
    #[schemars(description = "Your current thinking step")]
    pub thought: String,

    #[schemars(description = "Current thought number", range(min = 1))]
    pub thought_number: u32,

    #[schemars(description = "Estimated total thoughts needed", range(min = 1))]
    pub total_thoughts: u32,

    #[schemars(description = "Whether another thought step is needed")]
    pub next_thought_needed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Whether this revises previous thinking")]
    pub is_revision: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Which thought is being reconsidered", range(min = 1))]
    pub revises_thought: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Branching point thought number", range(min = 1))]
    pub branch_from_thought: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Branch identifier")]
    pub branch_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "If more thoughts are needed")]
    pub needs_more_thoughts: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Current step recommendation")]
    pub current_step: Option<StepRecommendation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Steps already recommended")]
    pub previous_steps: Option<Vec<StepRecommendation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "High-level descriptions of upcoming steps")]
    pub remaining_steps: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Array of MCP tool names available for use")]
    pub available_mcp_tools: Option<Vec<String>>,
}

impl ThoughtData {
    /// Minimal thought with no optional fields set
    pub fn new(thought: impl Into<String>, thought_number: u32, total_thoughts: u32, next_thought_needed: bool) -> Self {
        Self {
            thought: thought.into(),
            thought_number,
            total_thoughts,
            next_thought_needed,
            is_revision: None,
            revises_thought: None,
            branch_from_thought: None,
            branch_id: None,
            needs_more_thoughts: None,
            current_step: None,
            previous_steps: None,
            remaining_steps: None,
            available_mcp_tools: None,
        }
    }

    pub fn is_revision(&self) -> bool {
        self.is_revision.unwrap_or(false)
    }

    /// Branch the thought belongs to, only when both branch fields are set
    pub fn branch_key(&self) -> Option<&str> {
        match (self.branch_from_thought, self.branch_id.as_deref()) {
            (Some(_), Some(id)) => Some(id),
            _ => None,
        }
    }
}

/// Recommendation for one reasoning step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StepRecommendation {
    #[schemars(description = "What needs to be done")]
    pub step_description: String,

    #[schemars(description = "Tools recommended for this step")]
    pub recommended_tools: Vec<ToolRecommendation>,

    #[schemars(description = "What to expect from this step")]
    pub expected_outcome: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Conditions to consider for the next step")]
    pub next_step_conditions: Option<Vec<String>>,
}

/// A tool suggested for a step, with its priority and reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ToolRecommendation {
    #[schemars(description = "Name of the tool being recommended")]
    pub tool_name: String,

    /// Kept as the caller sent it so the acknowledgment echoes it verbatim.
    #[schemars(description = "Priority of the tool (lower is higher priority)")]
    pub priority: Number,

    #[schemars(description = "Why this tool is recommended")]
    pub rationale: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Alternative tools that could be used")]
    pub alternatives: Option<Vec<String>>,

    /// Opaque to the server; only ever re-serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Suggested input parameters for the tool")]
    pub suggested_inputs: Option<Value>,
}

/// Descriptor of a tool known to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: Map<String, Value>,
}

/// Acknowledgment returned for an accepted thought
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThoughtAcknowledgment {
    pub thought_number: u32,
    pub total_thoughts: u32,
    pub next_thought_needed: bool,
    pub branches: Vec<String>,
    pub thought_history_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_mcp_tools: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<StepRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_steps: Option<Vec<StepRecommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_steps: Option<Vec<String>>,
}

/// Payload reported when a submission could not be processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResponse {
    pub error: String,
    pub status: String,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: "failed".to_string(),
        }
    }
}
