//! Structured evaluation feedback produced by the coach.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::domain::foundation::ValidationError;

/// One correction from the evaluation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    #[serde(alias = "error_type")]
    pub category: String,
    pub incorrect_phrase: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub explanation: String,
}

impl FeedbackItem {
    pub fn new(
        category: impl Into<String>,
        incorrect_phrase: impl Into<String>,
        suggestion: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            incorrect_phrase: incorrect_phrase.into(),
            suggestion: suggestion.into(),
            explanation: explanation.into(),
        }
    }

    /// Category and phrase are the ledger keys and must be present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::empty_field("category"));
        }
        if self.incorrect_phrase.trim().is_empty() {
            return Err(ValidationError::empty_field("incorrect_phrase"));
        }
        Ok(())
    }
}

/// Whole-entry evaluation: a summary plus individual corrections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvaluationFeedback {
    pub high_level_summary: String,
    pub feedback_items: Vec<FeedbackItem>,
}

impl EvaluationFeedback {
    /// Reads a policy reply leniently.
    ///
    /// Accepts the misspelled `high_level_level_summary` key. Items that do
    /// not deserialize or fail validation are skipped.
    pub fn from_value(value: &Value) -> Self {
        let high_level_summary = value
            .get("high_level_summary")
            .or_else(|| value.get("high_level_level_summary"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let feedback_items = value
            .get("feedback_items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, raw)| {
                        match serde_json::from_value::<FeedbackItem>(raw.clone()) {
                            Ok(item) if item.validate().is_ok() => Some(item),
                            Ok(_) => {
                                warn!(index, "Skipping feedback item with blank keys");
                                None
                            }
                            Err(e) => {
                                warn!(index, error = %e, "Skipping malformed feedback item");
                                None
                            }
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            high_level_summary,
            feedback_items,
        }
    }
}
