//! HTTP Provider - AIProvider backed by a prompt-gateway endpoint.
//!
//! The gateway accepts `{"prompt", "model"}` as JSON, or the same fields as
//! multipart form data with an `image` file part when a picture is attached.
//! It replies with raw model text, from which JSON is extracted on demand.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpProviderConfig::new("http://localhost:5200/poso")
//!     .with_models("gemini-lite", "gemini-flash")
//!     .with_api_key(key);
//!
//! let provider = HttpProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::domain::coaching::extract_json;
use crate::ports::{AIError, AIProvider, ModelTier, PolicyOutput, PolicyRequest, ResponseFormat};

/// Configuration for the HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    pub endpoint_url: String,
    api_key: Option<Secret<String>>,
    pub lite_model: String,
    pub flash_model: String,
    /// Transport timeout per request.
    pub timeout: Duration,
}

impl HttpProviderConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            api_key: None,
            lite_model: "gemini-2.5-flash-lite".to_string(),
            flash_model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(90),
        }
    }

    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_models(mut self, lite: impl Into<String>, flash: impl Into<String>) -> Self {
        self.lite_model = lite.into();
        self.flash_model = flash.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model name for a tier.
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Lite => &self.lite_model,
            ModelTier::Flash => &self.flash_model,
        }
    }
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

/// Prompt-gateway provider. Makes exactly one attempt per call.
pub struct HttpProvider {
    config: HttpProviderConfig,
    client: Client,
}

impl HttpProvider {
    /// Creates a provider with a configured HTTP client.
    pub fn new(config: HttpProviderConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    async fn send(&self, request: &PolicyRequest) -> Result<Response, AIError> {
        let model = self.config.model_for(request.tier);
        let mut builder = self.client.post(&self.config.endpoint_url);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        builder = match &request.image {
            Some(image) => {
                let part = Part::bytes(image.clone())
                    .file_name("image.jpg")
                    .mime_str("image/jpeg")
                    .map_err(|e| AIError::InvalidRequest(e.to_string()))?;
                let form = Form::new()
                    .text("prompt", request.prompt.clone())
                    .text("model", model.to_string())
                    .part("image", part);
                builder.multipart(form)
            }
            None => builder.json(&GatewayRequest {
                prompt: &request.prompt,
                model,
            }),
        };

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AIError::Timeout {
                    timeout_secs: self.config.timeout.as_secs(),
                }
            } else if e.is_connect() {
                AIError::network(format!("Connection failed: {}", e))
            } else {
                AIError::network(e.to_string())
            }
        })
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(30)),
            400..=499 => Err(AIError::InvalidRequest(body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, body
            ))),
        }
    }
}

/// Turns raw gateway text into the requested output shape.
pub fn parse_reply(body: &str, format: ResponseFormat) -> Result<PolicyOutput, AIError> {
    match format {
        ResponseFormat::Json => extract_json(body)
            .map(PolicyOutput::Json)
            .ok_or_else(|| AIError::parse("reply contained no JSON value")),
        ResponseFormat::Text => {
            let text = body.trim();
            if text.is_empty() {
                Err(AIError::parse("empty reply"))
            } else {
                Ok(PolicyOutput::Text(text.to_string()))
            }
        }
    }
}

#[async_trait]
impl AIProvider for HttpProvider {
    async fn invoke(&self, request: PolicyRequest) -> Result<PolicyOutput, AIError> {
        debug!(
            trace_id = %request.trace_id,
            model = self.config.model_for(request.tier),
            multimodal = request.image.is_some(),
            "Sending prompt to gateway"
        );
        let response = self.send(&request).await?;
        let response = self.handle_response_status(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AIError::network(format!("failed to read body: {}", e)))?;
        parse_reply(&body, request.format)
    }
}
