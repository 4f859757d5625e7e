pub mod openai;
pub mod oracle;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::Message;

/// Errors a single generation attempt can produce
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl OracleError {
    /// Transport failures and non-success statuses are worth another attempt;
    /// a reply we could not understand is not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OracleError::Malformed(_))
    }
}

/// Sampling knobs forwarded with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            top_p: 0.9,
            max_tokens: 500,
        }
    }
}

/// A stateless text-generation backend.
///
/// Implementations perform exactly one attempt per call; retries, timeouts
/// and degradation live in [`Oracle`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<String, OracleError>;
}

pub use openai::OpenAiClient;
pub use oracle::{Oracle, RetryPolicy, PLACEHOLDER_RESPONSE};
