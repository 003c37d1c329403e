//! Coaching session configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Maximum conversation-type messages per journal.
pub const MAX_CHAT_TURNS: u32 = 40;

/// Turn orchestration settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Conversation messages allowed per journal
    #[serde(default = "default_max_chat_turns")]
    pub max_chat_turns: u32,

    /// Serialize turns per journal so the cap is strict within one process
    #[serde(default = "default_true")]
    pub serialize_turns: bool,

    /// Whether quick correction runs when a turn does not say
    #[serde(default = "default_true")]
    pub quick_correction_default: bool,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_chat_turns == 0 {
            return Err(ValidationError::MustBePositive("session.max_chat_turns"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_chat_turns: default_max_chat_turns(),
            serialize_turns: true,
            quick_correction_default: true,
        }
    }
}

fn default_max_chat_turns() -> u32 {
    MAX_CHAT_TURNS
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_chat_turns, 40);
        assert!(config.serialize_turns);
        assert!(config.quick_correction_default);
    }

    #[test]
    fn test_zero_cap_is_invalid() {
        let config = SessionConfig {
            max_chat_turns: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
