//! Conversational memory sent to the oracle.
//!
//! The oracle remembers nothing between calls, so the whole [`History`] is
//! replayed on every request. [`ContextWindow`] keeps it bounded by folding
//! the oldest turns into a single summary message while leaving the most
//! recent turns untouched.

use serde::{Deserialize, Serialize};

use crate::llm::Oracle;
use crate::prompts::templates::DEGRADED_SUMMARY;
use crate::prompts::PromptBuilder;
use crate::types::Message;

/// Prefix of the synthetic message that replaces summarized turns
pub const SUMMARY_PREFIX: &str = "SUMMARY: ";

/// Chronological record of the top-level conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The last `n` messages, or all of them if there are fewer
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Size bounds for the history replayed to the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    /// Histories at or under this length are left alone
    pub max_messages: usize,
    /// Number of trailing messages preserved verbatim
    pub keep_tail: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self {
            max_messages: 30,
            keep_tail: 10,
        }
    }
}

impl ContextWindow {
    pub fn needs_compaction(&self, history: &History) -> bool {
        history.len() > self.max_messages
    }

    /// Replace everything but the last `keep_tail` messages with one summary.
    ///
    /// Returns `false` without touching the oracle when the history already
    /// fits. If the summary request fails a fixed degraded summary is used so
    /// the bound still holds.
    pub async fn compact(
        &self,
        history: &mut History,
        oracle: &Oracle,
        prompts: &PromptBuilder,
    ) -> bool {
        if !self.needs_compaction(history) {
            return false;
        }

        let split = history.len() - self.keep_tail.min(history.len());
        let tail = history.messages.split_off(split);
        let head = std::mem::take(&mut history.messages);

        let summary = match oracle.try_generate(&prompts.summarize(&head)).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Summarization failed, using degraded summary: {}", e);
                DEGRADED_SUMMARY.to_string()
            }
        };

        log::info!("Compacted {} messages into a summary", head.len());

        let mut messages = Vec::with_capacity(tail.len() + 1);
        messages.push(Message::system(format!("{}{}", SUMMARY_PREFIX, summary)));
        messages.extend(tail);
        history.messages = messages;
        true
    }
}
