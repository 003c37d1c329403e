//! Profile module - long-lived learner context derived from finished journals.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{Timestamp, UserId};

/// Per-user profile blob, replaced wholesale by each agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContextProfile {
    pub user_id: UserId,
    pub profile_data: Value,
    pub last_updated: Timestamp,
}

impl UserContextProfile {
    /// An empty profile for a user the agent has not processed yet.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            profile_data: Value::Object(Default::default()),
            last_updated: Timestamp::now(),
        }
    }

    /// Replaces the whole blob. Keys absent from `data` do not survive.
    pub fn overwrite(&mut self, data: Value, now: Timestamp) {
        self.profile_data = data;
        self.last_updated = now;
    }
}

/// Behavioral observations extracted from a journal summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CognitiveProfile {
    #[serde(default)]
    pub recurring_themes: Vec<String>,
    #[serde(default)]
    pub decision_style: String,
    #[serde(default)]
    pub recent_sentiments: String,
}

/// A recurring error type with an example sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonError {
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub example: String,
}

/// Language-level observations extracted from the learner's own text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LinguisticProfile {
    #[serde(default)]
    pub common_errors: Vec<CommonError>,
    #[serde(default)]
    pub vocabulary_level: String,
    #[serde(default)]
    pub strength: String,
}

/// The shape written into `profile_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProfileData {
    pub linguistic_profile: LinguisticProfile,
    pub cognitive_profile: CognitiveProfile,
}

impl ProfileData {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
