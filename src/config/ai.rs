//! AI policy endpoint configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{HttpProviderConfig, RetryPolicy};

/// AI policy endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gateway endpoint that accepts `{prompt, model}` requests.
    /// Empty means the binary falls back to the mock provider.
    #[serde(default)]
    pub endpoint_url: String,

    /// Bearer token for the gateway
    pub api_key: Option<Secret<String>>,

    /// Model used for text-only prompts
    #[serde(default = "default_lite_model")]
    pub lite_model: String,

    /// Model used for multimodal prompts
    #[serde(default = "default_flash_model")]
    pub flash_model: String,

    /// Attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles afterwards
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Whether a real endpoint is configured.
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint_url.trim().is_empty()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: self.initial_backoff(),
            per_call_timeout: self.timeout(),
        }
    }

    pub fn provider_config(&self) -> HttpProviderConfig {
        let mut config = HttpProviderConfig::new(self.endpoint_url.clone())
            .with_models(self.lite_model.clone(), self.flash_model.clone())
            .with_timeout(self.timeout());
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        config
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.has_endpoint()
            && !self.endpoint_url.starts_with("http://")
            && !self.endpoint_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidEndpointUrl);
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("ai.max_attempts"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::MustBePositive("ai.timeout_secs"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            api_key: None,
            lite_model: default_lite_model(),
            flash_model: default_flash_model(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_lite_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_flash_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    90
}
