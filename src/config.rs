use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThinkingError};
use crate::models::Tool;
use crate::tracker::DEFAULT_MAX_HISTORY_SIZE;
use crate::validation::DEFAULT_MAX_THOUGHT_LENGTH;

/// Sequential thinking server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThinkingConfig {
    /// Server identity reported to clients
    pub server: ServerConfig,
    /// Reasoning history settings
    pub history: HistoryConfig,
    /// Input validation limits
    pub validation: ValidationConfig,
    /// Extra tools registered alongside the built-in one
    #[serde(default)]
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of thoughts kept before the oldest are dropped
    #[serde(deserialize_with = "history_size")]
    pub max_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub max_thought_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: "MCP server for sequential thinking with tool recommendations".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_HISTORY_SIZE,
        }
    }
}

/// Accepts any value for `history.max_size`; anything that is not a positive
/// integer comes back as 0 and is replaced by the default after loading.
fn history_size<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Count(i64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let size = match RawSize::deserialize(deserializer)? {
        RawSize::Count(n) => n,
        RawSize::Text(text) => text.trim().parse().unwrap_or(0),
        RawSize::Other(_) => 0,
    };
    Ok(usize::try_from(size).unwrap_or(0))
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_thought_length: DEFAULT_MAX_THOUGHT_LENGTH,
        }
    }
}

impl ThinkingConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load() -> Result<Self> {
        let file = std::env::var("SEQUENTIAL_THINKING_CONFIG")
            .unwrap_or_else(|_| "sequential-thinking.toml".to_string());
        let legacy_max = std::env::var("MAX_HISTORY_SIZE").ok();
        Self::load_from(&file, legacy_max.as_deref())
    }

    /// Load configuration using `file` as the optional config file and
    /// `legacy_max_history` as the value of the old `MAX_HISTORY_SIZE` variable
    pub fn load_from(file: &str, legacy_max_history: Option<&str>) -> Result<Self> {
        let defaults = ThinkingConfig::default();

        let mut builder = Config::builder()
            .set_default("server.name", defaults.server.name)?
            .set_default("server.version", defaults.server.version)?
            .set_default("server.instructions", defaults.server.instructions)?
            .set_default("history.max_size", defaults.history.max_size as i64)?
            .set_default("validation.max_thought_length", defaults.validation.max_thought_length as i64)?
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("SEQUENTIAL_THINKING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(raw) = legacy_max_history {
            match raw.trim().parse::<i64>() {
                Ok(size) if size > 0 => {
                    tracing::info!("Using MAX_HISTORY_SIZE: {}", size);
                    builder = builder.set_override("history.max_size", size)?;
                }
                _ => tracing::warn!(
                    "Ignoring invalid MAX_HISTORY_SIZE '{}', using configured history size",
                    raw
                ),
            }
        }

        let mut config: ThinkingConfig = builder.build()?.try_deserialize()?;
        if config.history.max_size == 0 {
            tracing::warn!(
                "history.max_size must be a positive integer, using {}",
                DEFAULT_MAX_HISTORY_SIZE
            );
            config.history.max_size = DEFAULT_MAX_HISTORY_SIZE;
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.name.trim().is_empty() {
            return Err(ThinkingError::Validation {
                field: "server.name".to_string(),
                reason: "server name cannot be empty".to_string(),
            });
        }
        if self.validation.max_thought_length == 0 {
            return Err(ThinkingError::Validation {
                field: "validation.max_thought_length".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if let Some(tool) = self.tools.iter().find(|t| t.name.trim().is_empty()) {
            return Err(ThinkingError::Validation {
                field: "tools.name".to_string(),
                reason: format!("tool with description '{}' has an empty name", tool.description),
            });
        }

        tracing::info!(
            "Configuration validated: history bound {}, {} extra tool(s)",
            self.history.max_size,
            self.tools.len()
        );
        Ok(())
    }
}
