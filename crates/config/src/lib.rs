//! Configuration loading, validation, and management for DataScout.
//!
//! Loads configuration from `~/.datascout/config.toml` with environment
//! variable overrides. All settings are validated at startup and immutable
//! for the process lifetime.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.datascout/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Planner (LLM) settings
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Warehouse query service settings
    #[serde(default)]
    pub warehouse: WarehouseConfig,

    /// Slack transport settings
    #[serde(default)]
    pub slack: SlackConfig,

    /// Context window settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Retry policy for all external calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Status-poll policy for query execution
    #[serde(default)]
    pub poll: PollConfig,

    /// Orchestration loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation store settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("planner", &self.planner)
            .field("warehouse", &self.warehouse)
            .field("slack", &self.slack)
            .field("context", &self.context)
            .field("retry", &self.retry)
            .field("poll", &self.poll)
            .field("agent", &self.agent)
            .field("store", &self.store)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// API key. Overridden by `ANTHROPIC_API_KEY` if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for planning and answering.
    #[serde(default = "default_model")]
    pub model: String,

    /// Max tokens per planner response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_max_tokens() -> u32 {
    4000
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl std::fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Base URL of the query gateway.
    #[serde(default = "default_warehouse_endpoint")]
    pub endpoint: String,

    /// Where the service should place result files (e.g. an S3 URI).
    #[serde(default)]
    pub output_location: String,

    /// Execution workgroup / queue name.
    #[serde(default = "default_workgroup")]
    pub workgroup: String,
}

fn default_warehouse_endpoint() -> String {
    "http://127.0.0.1:8181".into()
}
fn default_workgroup() -> String {
    "primary".into()
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            endpoint: default_warehouse_endpoint(),
            output_location: String::new(),
            workgroup: default_workgroup(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct SlackConfig {
    /// Bot token (xoxb-...). Overridden by `SLACK_BOT_TOKEN` if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// App-level token (xapp-...) for Socket Mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_token: Option<String>,

    /// Allowlist of sender IDs. Empty = deny all. ["*"] = allow all.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("app_token", &redact(&self.app_token))
            .field("allowed_users", &self.allowed_users)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// How many prior messages to consider. 0 = no context.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Minimum similarity score a history message needs to survive
    /// filtering.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Whether relevance filtering is applied at all.
    #[serde(default = "default_true")]
    pub filtering_enabled: bool,
}

fn default_window_size() -> usize {
    10
}
fn default_similarity_threshold() -> f64 {
    0.25
}
fn default_true() -> bool {
    true
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            similarity_threshold: default_similarity_threshold(),
            filtering_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    500
}
fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

fn default_initial_interval_ms() -> u64 {
    400
}
fn default_max_interval_ms() -> u64 {
    5_000
}
fn default_max_wait_secs() -> u64 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum planner round-trips per question.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Global wall-clock budget per question.
    #[serde(default = "default_question_timeout_secs")]
    pub question_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_question_timeout_secs() -> u64 {
    300
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            question_timeout_secs: default_question_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// Evict threads idle longer than this many seconds. 0 = never evict.
    #[serde(default)]
    pub idle_eviction_secs: u64,
}

impl AppConfig {
    /// Load configuration from the default path (~/.datascout/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `ANTHROPIC_API_KEY` — planner API key
    /// - `SLACK_BOT_TOKEN` / `SLACK_APP_TOKEN` — Slack credentials
    /// - `DATASCOUT_WAREHOUSE_ENDPOINT` — query gateway URL
    /// - `DATASCOUT_OUTPUT_LOCATION` — result output location
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.planner.api_key = Some(key);
        }
        if let Ok(token) = std::env::var("SLACK_BOT_TOKEN") {
            config.slack.bot_token = Some(token);
        }
        if let Ok(token) = std::env::var("SLACK_APP_TOKEN") {
            config.slack.app_token = Some(token);
        }
        if let Ok(endpoint) = std::env::var("DATASCOUT_WAREHOUSE_ENDPOINT") {
            config.warehouse.endpoint = endpoint;
        }
        if let Ok(loc) = std::env::var("DATASCOUT_OUTPUT_LOCATION") {
            config.warehouse.output_location = loc;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".datascout")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::ValidationError(
                "retry.base_delay_ms must not exceed retry.max_delay_ms".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.context.similarity_threshold) {
            return Err(ConfigError::ValidationError(
                "context.similarity_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.poll.max_wait_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll.max_wait_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Retry policy durations as `std::time::Duration`s.
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry.base_delay_ms)
    }

    pub fn retry_max_delay(&self) -> Duration {
        Duration::from_millis(self.retry.max_delay_ms)
    }

    /// Generate a default config TOML string (for first-run onboarding).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            warehouse: WarehouseConfig::default(),
            slack: SlackConfig::default(),
            context: ContextConfig::default(),
            retry: RetryConfig::default(),
            poll: PollConfig::default(),
            agent: AgentConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
