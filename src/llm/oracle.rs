use std::sync::Arc;
use std::time::Duration;

use super::{LlmClient, OracleError, SamplingParams};
use crate::types::Message;

/// Text used in place of a reply when the backend cannot be reached
pub const PLACEHOLDER_RESPONSE: &str = "[The realm is silent; no response comes.]";

/// How hard to try before giving up on a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

/// Wraps a backend with timeouts, retries and graceful degradation.
///
/// Calls are awaited one at a time by the engine, so there is never more
/// than one request in flight.
#[derive(Clone)]
pub struct Oracle {
    client: Arc<dyn LlmClient>,
    params: SamplingParams,
    retry: RetryPolicy,
}

impl Oracle {
    pub fn new(client: impl LlmClient + 'static) -> Self {
        Self {
            client: Arc::new(client),
            params: SamplingParams::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Runs the request with retries and returns the last error on failure
    pub async fn try_generate(&self, messages: &[Message]) -> Result<String, OracleError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = OracleError::Transport("no attempts made".to_string());

        for attempt in 1..=attempts {
            let outcome = tokio::time::timeout(
                self.retry.attempt_timeout,
                self.client.generate(messages, &self.params),
            )
            .await
            .unwrap_or(Err(OracleError::Timeout));

            match outcome {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() => {
                    log::warn!("Oracle attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = e;
                    if attempt < attempts {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                Err(e) => {
                    log::error!("Oracle returned an unusable reply: {}", e);
                    return Err(e);
                }
            }
        }

        Err(last_error)
    }

    /// Like [`Oracle::try_generate`] but never fails: any error becomes
    /// [`PLACEHOLDER_RESPONSE`] so the game can keep going.
    pub async fn generate(&self, messages: &[Message]) -> String {
        match self.try_generate(messages).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Could not reach the oracle, continuing with placeholder: {}", e);
                PLACEHOLDER_RESPONSE.to_string()
            }
        }
    }
}
