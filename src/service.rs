use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, ErrorData, ServerCapabilities, ServerInfo},
    ServerHandler,
};
use rmcp_macros::{tool, tool_handler, tool_router};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ThinkingConfig;
use crate::handlers::ThinkingServer;
use crate::models::ThoughtData;
use crate::response::StepEnvelope;

/// Raw tool arguments.
///
/// Advertises the `ThoughtData` schema to clients but is deserialized
/// untyped, so the validator can report the first violated constraint.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct StepInput(pub Value);

impl JsonSchema for StepInput {
    fn schema_name() -> Cow<'static, str> {
        "SequentialThinkingInput".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        ThoughtData::json_schema(generator)
    }
}

/// Main service struct for the sequential thinking MCP server
#[derive(Clone)]
pub struct SequentialThinkingService {
    tool_router: ToolRouter<Self>,
    // the tracker does no locking, so submissions are serialized here
    server: Arc<Mutex<ThinkingServer>>,
    config: ThinkingConfig,
}

impl SequentialThinkingService {
    /// Create a service from environment and file configuration
    pub fn from_env() -> crate::error::Result<Self> {
        let config = ThinkingConfig::load()?;
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn new(config: ThinkingConfig) -> Self {
        tracing::info!(
            "Initializing {} v{} (history bound: {})",
            config.server.name,
            config.server.version,
            config.history.max_size
        );
        let server = ThinkingServer::new(&config);
        Self {
            tool_router: Self::tool_router(),
            server: Arc::new(Mutex::new(server)),
            config,
        }
    }

    /// Process one raw step submission against this session's state
    pub async fn process_step(&self, raw: Value) -> StepEnvelope {
        self.server.lock().await.process_step(raw)
    }

    /// Drop the session's history and branches
    pub async fn clear_history(&self) {
        self.server.lock().await.clear_history();
    }

    pub async fn history_len(&self) -> usize {
        self.server.lock().await.tracker().history_len()
    }

    pub fn config(&self) -> &ThinkingConfig {
        &self.config
    }
}

#[tool_router]
impl SequentialThinkingService {
    #[tool(description = "A detailed tool for dynamic and reflective problem-solving through thoughts. Each thought can build on, question, or revise previous insights, or branch into an alternative line of reasoning. For each step, recommend which MCP tools to use next with a priority, rationale, alternatives and suggested inputs. The server tracks the reasoning and recommendations only; the client executes the tools.")]
    pub async fn sequentialthinking_tools(
        &self,
        params: Parameters<StepInput>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let envelope = self.process_step(params.0 .0).await;
        Ok(envelope.into())
    }
}

#[tool_handler]
impl ServerHandler for SequentialThinkingService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: rmcp::model::ProtocolVersion::V_2024_11_05,
            server_info: rmcp::model::Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(self.config.server.instructions.clone()),
        }
    }
}
