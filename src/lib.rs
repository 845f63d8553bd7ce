// Library exports for testing
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod registry;
pub mod response;
pub mod service;
pub mod tracker;
pub mod validation;
pub mod visual;

pub use crate::config::{HistoryConfig, ServerConfig, ThinkingConfig, ValidationConfig};
pub use error::{Result, ThinkingError};
pub use handlers::ThinkingServer;
pub use models::*;
pub use registry::{RegisterOutcome, ToolRegistry};
pub use response::{StepEnvelope, TextContent};
pub use service::{SequentialThinkingService, StepInput};
pub use tracker::{ReasoningState, ReasoningTracker, DEFAULT_MAX_HISTORY_SIZE};
pub use validation::{InputValidator, ValidationError};
pub use visual::{ThoughtRenderer, VisualOutput};
