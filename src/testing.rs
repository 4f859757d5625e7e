//! Testing utilities.
//!
//! [`ScriptedOracle`] stands in for a real backend so game flows can be
//! exercised deterministically without network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::llm::{LlmClient, OracleError, SamplingParams};
use crate::types::Message;

/// Reply given once the script runs out
pub const DEFAULT_SCRIPTED_REPLY: &str = "Nothing else stirs.";

#[derive(Default)]
struct Script {
    replies: VecDeque<Result<String, OracleError>>,
    requests: Vec<Vec<Message>>,
}

/// A backend that returns queued replies in order and records every request.
///
/// Clones share the same script, so a test can hand one clone to the engine
/// and keep another to inspect what was sent.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    script: Arc<Mutex<Script>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a script pre-loaded with successful replies
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let oracle = Self::new();
        for reply in replies {
            oracle.push_reply(reply);
        }
        oracle
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock().replies.push_back(Ok(reply.into()));
    }

    pub fn push_error(&self, error: OracleError) {
        self.lock().replies.push_back(Err(error));
    }

    /// Number of generate calls received so far
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Every request received, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.lock().requests.clone()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<Vec<Message>> {
        self.lock().requests.last().cloned()
    }

    /// Replies still waiting to be consumed
    pub fn remaining(&self) -> usize {
        self.lock().replies.len()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        // A panicking test poisons the lock; the script itself is still usable.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LlmClient for ScriptedOracle {
    async fn generate(
        &self,
        messages: &[Message],
        _params: &SamplingParams,
    ) -> Result<String, OracleError> {
        let mut script = self.lock();
        script.requests.push(messages.to_vec());
        script
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(DEFAULT_SCRIPTED_REPLY.to_string()))
    }
}
