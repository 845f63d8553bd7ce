use serde_json::Value;

use crate::config::ThinkingConfig;
use crate::error::{Result, ThinkingError};
use crate::models::Tool;
use crate::registry::{RegisterOutcome, ToolRegistry};
use crate::response::StepEnvelope;
use crate::tracker::ReasoningTracker;
use crate::validation::InputValidator;
use crate::visual::{ThoughtRenderer, VisualOutput};

/// One reasoning session: validator, tracker, formatter and tool registry
#[derive(Debug)]
pub struct ThinkingServer {
    validator: InputValidator,
    tracker: ReasoningTracker,
    registry: ToolRegistry,
    renderer: Box<dyn ThoughtRenderer>,
}

impl ThinkingServer {
    pub fn new(config: &ThinkingConfig) -> Self {
        Self::with_renderer(config, Box::new(VisualOutput::new()))
    }

    /// Build a session that renders accepted thoughts through `renderer`
    pub fn with_renderer(config: &ThinkingConfig, renderer: Box<dyn ThoughtRenderer>) -> Self {
        Self {
            validator: InputValidator::new(config.validation.max_thought_length),
            tracker: ReasoningTracker::new(config.history.max_size),
            registry: ToolRegistry::with_builtin(config.tools.clone()),
            renderer,
        }
    }

    /// Handle a raw step submission and build the caller-facing envelope.
    ///
    /// Never fails: validation and internal errors both become a failure
    /// envelope, and the server stays usable afterwards.
    pub fn process_step(&mut self, raw: Value) -> StepEnvelope {
        match self.try_process_step(&raw) {
            Ok(envelope) => envelope,
            Err(ThinkingError::Validation { field, reason }) => {
                tracing::warn!("Rejected thought ({}): {}", field, reason);
                StepEnvelope::failure(reason)
            }
            Err(e) => {
                tracing::error!("sequentialthinking_tools error: {}", e);
                self.renderer.error(&e.to_string());
                StepEnvelope::failure(e.to_string())
            }
        }
    }

    fn try_process_step(&mut self, raw: &Value) -> Result<StepEnvelope> {
        let thought = self.validator.validate(raw)?;

        tracing::info!(
            "Processing thought {} of {}",
            thought.thought_number,
            thought.total_thoughts
        );

        let ack = self.tracker.accept(thought);

        // History is already updated if rendering or serialization fails below.
        let latest = self.tracker.latest().ok_or_else(|| {
            ThinkingError::Internal("accepted thought missing from history".to_string())
        })?;
        self.renderer.render(latest)?;
        Ok(StepEnvelope::success(&ack)?)
    }

    /// Register an extra tool at runtime
    pub fn add_tool(&mut self, tool: Tool) -> RegisterOutcome {
        self.registry.add(tool)
    }

    pub fn available_tools(&self) -> &[Tool] {
        self.registry.tools()
    }

    pub fn clear_history(&mut self) {
        self.tracker.clear_history();
    }

    pub fn tracker(&self) -> &ReasoningTracker {
        &self.tracker
    }
}

impl Default for ThinkingServer {
    fn default() -> Self {
        Self::new(&ThinkingConfig::default())
    }
}
