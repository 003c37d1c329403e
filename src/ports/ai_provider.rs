//! AI Provider Port - Interface for the coaching policy model.
//!
//! Every coaching decision (scaffolding action, writing help, evaluation,
//! quick correction, image description, profile extraction) goes through
//! this single capability. Callers choose the model tier and whether they
//! expect JSON or free text; the adapter handles transport and extraction.
//!
//! # Example
//!
//! ```ignore
//! let output = provider
//!     .invoke(PolicyRequest::json(prompt, ModelTier::Lite))
//!     .await?;
//! let value = output.into_json()?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::coaching::extract_json;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Port for AI policy invocations.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Run one prompt and return the parsed output.
    ///
    /// # Errors
    ///
    /// - `Exhausted` when a retrying implementation gave up
    /// - any transport or parse error from a single attempt
    async fn invoke(&self, request: PolicyRequest) -> Result<PolicyOutput, AIError>;
}

/// Model size class. Lite is cheap and fast; Flash handles images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Lite,
    Flash,
}

/// Expected shape of the model reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    /// Reply must contain a JSON object or array.
    Json,
    /// Reply is used as plain text.
    Text,
}

/// A single prompt invocation.
#[derive(Debug, Clone)]
pub struct PolicyRequest {
    pub prompt: String,
    pub tier: ModelTier,
    /// Raw image bytes for multimodal prompts.
    pub image: Option<Vec<u8>>,
    pub format: ResponseFormat,
    /// Correlation id for logs.
    pub trace_id: String,
}

impl PolicyRequest {
    /// Request expecting a JSON reply.
    pub fn json(prompt: impl Into<String>, tier: ModelTier) -> Self {
        Self::new(prompt, tier, ResponseFormat::Json)
    }

    /// Request expecting a plain-text reply.
    pub fn text(prompt: impl Into<String>, tier: ModelTier) -> Self {
        Self::new(prompt, tier, ResponseFormat::Text)
    }

    fn new(prompt: impl Into<String>, tier: ModelTier, format: ResponseFormat) -> Self {
        Self {
            prompt: prompt.into(),
            tier,
            image: None,
            format,
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Attaches an image to the request.
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Sets the trace id.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }
}

/// Parsed model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutput {
    Json(Value),
    Text(String),
}

impl PolicyOutput {
    /// Returns the JSON payload or a parse error for text output.
    pub fn into_json(self) -> Result<Value, AIError> {
        match self {
            PolicyOutput::Json(value) => Ok(value),
            PolicyOutput::Text(text) => extract_json(&text)
                .ok_or_else(|| AIError::parse("expected JSON reply, got plain text")),
        }
    }

    /// Returns the reply as text; JSON output is serialized.
    pub fn into_text(self) -> String {
        match self {
            PolicyOutput::Text(text) => text,
            PolicyOutput::Json(value) => value.to_string(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Reply could not be parsed into the requested format.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A single attempt exceeded the per-call timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// All retry attempts failed.
    #[error("gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if another attempt may succeed. Parse failures count.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
                | AIError::Parse(_)
        )
    }
}

impl From<AIError> for DomainError {
    fn from(err: AIError) -> Self {
        DomainError::new(ErrorCode::AIServiceUnavailable, err.to_string())
    }
}
