use colored::*;

use crate::error::Result;
use crate::models::{StepRecommendation, ThoughtData, ToolRecommendation};

/// Console sink for accepted thoughts and processing errors
pub trait ThoughtRenderer: std::fmt::Debug + Send {
    fn render(&self, thought: &ThoughtData) -> Result<()>;

    fn error(&self, message: &str);
}

/// Visual output for accepted thoughts.
/// Renders each thought as a bordered block on stderr, leaving stdout to the
/// MCP transport.
#[derive(Debug, Clone, Default)]
pub struct VisualOutput;

impl VisualOutput {
    pub fn new() -> Self {
        Self
    }

    /// Render and print a thought to stderr
    pub fn display_thought(&self, thought: &ThoughtData) -> serde_json::Result<()> {
        let rendered = self.format_thought(thought)?;
        eprintln!("{}", rendered);
        Ok(())
    }

    /// Display error messages
    pub fn error(&self, message: &str) {
        eprintln!("   {} {}", "❌".red(), message.red());
    }

    /// Render a thought, including its recommendation block, inside a border
    pub fn format_thought(&self, thought: &ThoughtData) -> serde_json::Result<String> {
        let (label, context) = if thought.is_revision() {
            (
                "🔄 Revision".yellow(),
                format!(" (revising thought {})", display_opt(thought.revises_thought)),
            )
        } else if let Some(origin) = thought.branch_from_thought {
            (
                "🌿 Branch".green(),
                format!(
                    " (from thought {}, ID: {})",
                    origin,
                    thought.branch_id.as_deref().unwrap_or("none")
                ),
            )
        } else {
            ("💭 Thought".blue(), String::new())
        };

        let counter = format!(" {}/{}{}", thought.thought_number, thought.total_thoughts, context);
        let header_width = label.chars().count() + counter.chars().count();
        let header = format!("{}{}", label, counter);

        let mut body = thought.thought.clone();
        if let Some(step) = &thought.current_step {
            body.push_str("\n\nRecommendation:\n");
            body.push_str(&self.format_recommendation(step)?);
        }

        Ok(boxed(&header, header_width, &body))
    }

    /// Render the recommended tools, expected outcome and next-step conditions
    pub fn format_recommendation(&self, step: &StepRecommendation) -> serde_json::Result<String> {
        let tools = step
            .recommended_tools
            .iter()
            .map(format_tool)
            .collect::<serde_json::Result<Vec<_>>>()?;

        let mut out = format!(
            "Step: {}\nRecommended Tools:\n{}\nExpected Outcome: {}",
            step.step_description,
            tools.join("\n"),
            step.expected_outcome
        );

        if let Some(conditions) = &step.next_step_conditions {
            out.push_str("\nConditions for next step:");
            for condition in conditions {
                out.push_str("\n  - ");
                out.push_str(condition);
            }
        }

        Ok(out)
    }
}

impl ThoughtRenderer for VisualOutput {
    fn render(&self, thought: &ThoughtData) -> Result<()> {
        Ok(self.display_thought(thought)?)
    }

    fn error(&self, message: &str) {
        VisualOutput::error(self, message)
    }
}

fn format_tool(tool: &ToolRecommendation) -> serde_json::Result<String> {
    let alternatives = match &tool.alternatives {
        Some(alts) if !alts.is_empty() => format!(" (alternatives: {})", alts.join(", ")),
        _ => String::new(),
    };
    let inputs = match &tool.suggested_inputs {
        Some(inputs) if !inputs.is_null() => {
            format!("\n    Suggested inputs: {}", serde_json::to_string(inputs)?)
        }
        _ => String::new(),
    };

    Ok(format!(
        "  - {} (priority: {}){}\n    Rationale: {}{}",
        tool.tool_name, tool.priority, alternatives, tool.rationale, inputs
    ))
}

fn display_opt(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Wrap a header and body in a border sized to the widest line.
/// `header_width` is the header's visible width, excluding colour codes.
fn boxed(header: &str, header_width: usize, body: &str) -> String {
    let width = body
        .lines()
        .map(|line| line.chars().count())
        .chain(std::iter::once(header_width))
        .max()
        .unwrap_or(0);
    let border = "─".repeat(width + 2);

    let mut out = String::new();
    out.push_str(&format!("\n┌{}┐\n", border));
    out.push_str(&format!("│ {}{} │\n", header, " ".repeat(width - header_width)));
    out.push_str(&format!("├{}┤\n", border));
    for line in body.lines() {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
    }
    out.push_str(&format!("└{}┘", border));
    out
}
