//! Planner trait — the abstraction over the LLM service.
//!
//! The planner decides which queries to run. DataScout treats it as a black
//! box: send {system prompt, tool catalog, ordered messages}, receive either
//! final text or a list of tool calls. No dependency on any model family.

use crate::error::PlannerError;
use crate::message::{Message, MessageToolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single planner invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerRequest {
    /// The model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// System prompt (instructions, current date, SQL guidelines)
    pub system: String,

    /// The ordered conversation messages (context + exchange so far)
    pub messages: Vec<Message>,

    /// The tool catalog the planner may draw on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A tool definition sent to the planner so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The planner's reply: either a final text answer or tool-call requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerResponse {
    /// Any text content in the reply
    pub text: String,

    /// Tool calls the planner wants executed, in order. Empty means the
    /// text is the final answer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,
}

impl PlannerResponse {
    /// Whether this response is a final answer (no tools requested).
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }

    /// Convert into the assistant message that carries it in the exchange.
    pub fn into_message(self) -> Message {
        let mut msg = Message::assistant(self.text);
        msg.tool_calls = self.tool_calls;
        msg
    }
}

/// The core Planner trait.
///
/// The orchestrator calls `complete()` without knowing which backend is being
/// used; every call site wraps the invocation in the retry executor.
#[async_trait]
pub trait Planner: Send + Sync {
    /// A human-readable name for this planner backend (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: PlannerRequest,
    ) -> std::result::Result<PlannerResponse, PlannerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_response_is_final() {
        let resp = PlannerResponse {
            text: "Revenue was $4,210".into(),
            tool_calls: vec![],
        };
        assert!(resp.is_final());
    }

    #[test]
    fn tool_call_response_is_not_final() {
        let resp = PlannerResponse {
            text: "Let me check the tables".into(),
            tool_calls: vec![MessageToolCall {
                id: "toolu_1".into(),
                name: "list_tables".into(),
                arguments: r#"{"database":"gam_prog"}"#.into(),
            }],
        };
        assert!(!resp.is_final());

        let msg = resp.into_message();
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].name, "list_tables");
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "run_query".into(),
            description: "Execute a read-only SQL query".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "sql": { "type": "string", "description": "The SELECT statement" }
                },
                "required": ["sql"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("run_query"));
        assert!(json.contains("sql"));
    }
}
