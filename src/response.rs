use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::models::{FailureResponse, ThoughtAcknowledgment};

/// Text block inside a step envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextContent {
    fn new(text: String) -> Self {
        Self { kind: "text", text }
    }
}

/// Caller-facing result of one step submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEnvelope {
    pub content: Vec<TextContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl StepEnvelope {
    /// Wrap an acknowledgment; fails only if it cannot be serialized
    pub fn success(ack: &ThoughtAcknowledgment) -> serde_json::Result<Self> {
        Ok(Self {
            content: vec![TextContent::new(serde_json::to_string_pretty(ack)?)],
            is_error: None,
        })
    }

    /// Wrap an error message as `{ "error": ..., "status": "failed" }`
    pub fn failure(message: impl Into<String>) -> Self {
        let payload = FailureResponse::new(message);
        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            format!(r#"{{"error": {:?}, "status": "failed"}}"#, payload.error)
        });
        Self {
            content: vec![TextContent::new(text)],
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Text of the first content block
    pub fn text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

impl From<StepEnvelope> for CallToolResult {
    fn from(envelope: StepEnvelope) -> Self {
        let is_error = envelope.is_error();
        let content = envelope
            .content
            .into_iter()
            .map(|c| Content::text(c.text))
            .collect();
        if is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}
