//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling a real model.
//!
//! # Features
//!
//! - Queued responses consumed in order
//! - Standing rules keyed on prompt text (for concurrent callers)
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_json(json!({"action": "ASK_QUESTION", "payload": {"question": "Why?"}}))
//!     .on_prompt_containing("grammar and spelling checker", json!({"status": "no_errors"}));
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{AIError, AIProvider, PolicyOutput, PolicyRequest, ResponseFormat};

/// A configured mock response.
#[derive(Debug)]
enum MockResponse {
    Output(PolicyOutput),
    Error(AIError),
}

/// Mock AI provider for testing.
#[derive(Debug, Clone, Default)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    rules: Arc<Mutex<Vec<(String, PolicyOutput)>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<PolicyRequest>>>,
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON reply.
    pub fn with_json(self, value: Value) -> Self {
        self.push(MockResponse::Output(PolicyOutput::Json(value)))
    }

    /// Queues a plain-text reply.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(MockResponse::Output(PolicyOutput::Text(text.into())))
    }

    /// Queues an error.
    pub fn with_error(self, error: AIError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Answers every prompt containing `needle` with `value`, ahead of the queue.
    pub fn on_prompt_containing(self, needle: impl Into<String>, value: Value) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), PolicyOutput::Json(value)));
        self
    }

    /// Like [`Self::on_prompt_containing`] with a text reply.
    pub fn on_prompt_containing_text(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.into(), PolicyOutput::Text(text.into())));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<PolicyRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns recorded prompts containing `needle`.
    pub fn prompts_containing(&self, needle: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.prompt.contains(needle))
            .map(|c| c.prompt.clone())
            .collect()
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    fn next_response(&self, request: &PolicyRequest) -> MockResponse {
        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, output)| output.clone());
        if let Some(output) = rule {
            return MockResponse::Output(output);
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                MockResponse::Output(match request.format {
                    ResponseFormat::Json => PolicyOutput::Json(json!({})),
                    ResponseFormat::Text => PolicyOutput::Text("Mock response".to_string()),
                })
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn invoke(&self, request: PolicyRequest) -> Result<PolicyOutput, AIError> {
        let response = self.next_response(&request);
        let format = request.format;
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match response {
            MockResponse::Output(output) => match format {
                ResponseFormat::Json => output.into_json().map(PolicyOutput::Json),
                ResponseFormat::Text => Ok(output),
            },
            MockResponse::Error(err) => Err(err),
        }
    }
}
