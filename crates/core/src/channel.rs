//! Channel trait — the abstraction over the chat transport.
//!
//! A Channel delivers inbound events (mentions, slash commands, DMs) and
//! accepts outbound text for a thread. Socket/webhook wiring is the channel
//! implementation's concern; the core only sees this contract.

use crate::error::ChannelError;
use crate::message::ThreadId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What kind of inbound event this is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The bot was @-mentioned in a channel.
    Mention,
    /// A slash command (e.g. /ask-data, /refresh).
    SlashCommand { command: String },
    /// A direct message to the bot.
    DirectMessage,
}

/// An inbound chat event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEvent {
    /// The conversation thread this event belongs to.
    pub thread_id: ThreadId,

    /// Platform-specific sender ID.
    pub user_id: String,

    /// The text content (mention markup already stripped).
    pub text: String,

    /// Event type.
    pub kind: EventKind,
}

/// The core Channel trait.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "slack").
    fn name(&self) -> &str;

    /// Start listening for incoming events.
    ///
    /// Returns a receiver that yields inbound events. The implementation
    /// handles its own connection management internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelEvent, ChannelError>>,
        ChannelError,
    >;

    /// Send a message to a thread.
    async fn send(&self, thread_id: &ThreadId, text: &str)
    -> std::result::Result<(), ChannelError>;

    /// Check if a sender is allowed (allowlist check).
    fn is_allowed(&self, sender_id: &str) -> bool;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let ev = ChannelEvent {
            thread_id: ThreadId::from("C42"),
            user_id: "U123".into(),
            text: "show me yesterday's revenue".into(),
            kind: EventKind::SlashCommand {
                command: "ask-data".into(),
            },
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("ask-data"));
        assert!(json.contains("C42"));
    }
}
