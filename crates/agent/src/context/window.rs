//! Sliding window selection over thread history.

use super::similarity::similarity_score;
use datascout_core::message::Message;
use tracing::debug;

/// Context selection parameters. Pure configuration — holds no state.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    /// How many recent messages to consider. 0 = no history at all.
    pub window_size: usize,

    /// Minimum similarity to the current question a message needs to stay
    /// in the window.
    pub similarity_threshold: f64,

    /// When false, the recency window is used as-is.
    pub filtering_enabled: bool,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            window_size: 10,
            similarity_threshold: 0.25,
            filtering_enabled: true,
        }
    }
}

impl ContextWindow {
    /// Select the history messages the planner will see for `question`.
    ///
    /// Takes the last `window_size` messages in chronological order, then
    /// (if filtering is on) drops the ones lexically unrelated to the
    /// question. Relative order always survives filtering.
    pub fn select(&self, history: &[Message], question: &str) -> Vec<Message> {
        if self.window_size == 0 {
            return Vec::new();
        }

        let start = history.len().saturating_sub(self.window_size);
        let window = &history[start..];

        if !self.filtering_enabled {
            return window.to_vec();
        }

        let selected: Vec<Message> = window
            .iter()
            .filter(|m| similarity_score(&m.content, question) >= self.similarity_threshold)
            .cloned()
            .collect();

        debug!(
            window = window.len(),
            selected = selected.len(),
            "Context window assembled"
        );
        selected
    }
}
