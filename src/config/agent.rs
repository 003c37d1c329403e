//! Background profile agent configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Settings for the profile refresh worker
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Jobs buffered before scheduling reports a full queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Attempts per job, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles afterwards
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl AgentConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 {
            return Err(ValidationError::MustBePositive("agent.queue_capacity"));
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("agent.max_attempts"));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    2000
}
