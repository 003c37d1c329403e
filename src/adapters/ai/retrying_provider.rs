//! Retrying AI Provider - bounded retries with doubling backoff.
//!
//! Wraps any provider. Each attempt is limited by a per-call timeout; the
//! delay between attempts starts at `initial_backoff` and doubles. When
//! every attempt fails, or a non-retryable error occurs, the wrapper
//! returns [`AIError::Exhausted`], which callers treat as service
//! unavailable.
//!
//! # Example
//!
//! ```ignore
//! let provider = RetryingAIProvider::new(HttpProvider::new(config)?, RetryPolicy::default());
//! ```

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{error, warn};

use crate::ports::{AIError, AIProvider, PolicyOutput, PolicyRequest};

/// Retry parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub per_call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            per_call_timeout: Duration::from_secs(90),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, for 1-based `attempt`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << shift)
    }
}

/// Provider wrapper that retries transient failures.
pub struct RetryingAIProvider<P: AIProvider> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: AIProvider> RetryingAIProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, request: PolicyRequest) -> Result<PolicyOutput, AIError> {
        match timeout(self.policy.per_call_timeout, self.inner.invoke(request)).await {
            Ok(result) => result,
            Err(_) => Err(AIError::Timeout {
                timeout_secs: self.policy.per_call_timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl<P: AIProvider> AIProvider for RetryingAIProvider<P> {
    async fn invoke(&self, request: PolicyRequest) -> Result<PolicyOutput, AIError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.attempt(request.clone()).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            let retryable = err.is_retryable();
            if !retryable || attempt >= max_attempts {
                error!(
                    trace_id = %request.trace_id,
                    attempt,
                    retryable,
                    error = %err,
                    "AI provider gave up"
                );
                return Err(AIError::Exhausted {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            let delay = self.policy.backoff_after(attempt);
            warn!(
                trace_id = %request.trace_id,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "AI provider attempt failed, retrying"
            );
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::ports::ModelTier;
    use serde_json::json;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            per_call_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
            per_call_timeout: Duration::from_secs(1),
        };
        assert_eq!(p.backoff_after(1), Duration::from_millis(100));
        assert_eq!(p.backoff_after(2), Duration::from_millis(200));
        assert_eq!(p.backoff_after(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failure() {
        let mock = MockAIProvider::new()
            .with_error(AIError::network("reset"))
            .with_json(json!({"ok": true}));
        let provider = RetryingAIProvider::new(mock.clone(), fast_policy(3));

        let out = provider
            .invoke(PolicyRequest::json("p", ModelTier::Lite))
            .await
            .unwrap();

        assert_eq!(out, PolicyOutput::Json(json!({"ok": true})));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let mock = MockAIProvider::new()
            .with_error(AIError::unavailable("down"))
            .with_error(AIError::unavailable("down"))
            .with_error(AIError::unavailable("down"));
        let provider = RetryingAIProvider::new(mock.clone(), fast_policy(2));

        let err = provider
            .invoke(PolicyRequest::text("p", ModelTier::Lite))
            .await
            .unwrap_err();

        match err {
            AIError::Exhausted { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let mock = MockAIProvider::new()
            .with_error(AIError::AuthenticationFailed)
            .with_text("never reached");
        let provider = RetryingAIProvider::new(mock.clone(), fast_policy(5));

        let err = provider
            .invoke(PolicyRequest::text("p", ModelTier::Lite))
            .await
            .unwrap_err();

        assert!(matches!(err, AIError::Exhausted { attempts: 1, .. }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn slow_attempt_times_out() {
        let mock = MockAIProvider::new()
            .with_delay(Duration::from_millis(500))
            .with_text("late");
        let provider = RetryingAIProvider::new(
            mock.clone(),
            RetryPolicy {
                max_attempts: 1,
                initial_backoff: Duration::from_millis(1),
                per_call_timeout: Duration::from_millis(20),
            },
        );

        let err = provider
            .invoke(PolicyRequest::text("p", ModelTier::Lite))
            .await
            .unwrap_err();

        match err {
            AIError::Exhausted { last_error, .. } => assert!(last_error.contains("timed out")),
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }
}
