//! Error types for the DataScout domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context has
//! its own error enum; the [`Retryable`] trait classifies failures so the
//! retry executor knows which ones are transient and which are fatal.

use thiserror::Error;

/// The top-level error type for all DataScout operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Planner (LLM) errors ---
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    // --- Warehouse query errors ---
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies a failure as transient (worth retrying) or fatal.
///
/// Implemented by every error type that flows through the retry executor.
/// Transient: rate limits, server overload, timeouts, connection resets.
/// Fatal: invalid input, authorization failures, malformed requests.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

// --- Bounded context errors ---

/// Failures talking to the LLM planner service.
#[derive(Debug, Clone, Error)]
pub enum PlannerError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by planner, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Planner overloaded: {0}")]
    Overloaded(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed planner response: {0}")]
    MalformedResponse(String),
}

impl Retryable for PlannerError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. }
            | Self::Overloaded(_)
            | Self::Timeout(_)
            | Self::Network(_) => true,
            // 5xx responses are server-side hiccups; 4xx means we sent garbage.
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::AuthenticationFailed(_) | Self::MalformedResponse(_) => false,
        }
    }
}

/// Failures in the warehouse query pipeline.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The safety gate refused the statement. Never retried.
    #[error("Query rejected: {0}")]
    Rejected(String),

    /// The remote query reached FAILED or CANCELLED.
    #[error("Query execution failed ({state}): {reason}")]
    ExecutionFailed { state: String, reason: String },

    /// The query did not reach a terminal state within the maximum wait.
    #[error("Query timed out after {waited_secs}s")]
    Timeout { waited_secs: u64 },

    #[error("Query service error: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Query service throttled the request")]
    Throttled,

    #[error("Network error: {0}")]
    Network(String),
}

impl Retryable for QueryError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Throttled | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::Rejected(_) | Self::ExecutionFailed { .. } | Self::Timeout { .. } => false,
        }
    }
}

/// Failures in the chat transport.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Message delivery failed to {thread_id}: {reason}")]
    DeliveryFailed { thread_id: String, reason: String },

    #[error("Unauthorized sender: {sender_id}")]
    Unauthorized { sender_id: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),
}

/// Failures executing a planner-requested tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
