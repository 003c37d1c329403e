//! Quick-correction side channel results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of checking one user message for its most significant error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuickCorrection {
    CorrectionFound {
        incorrect_phrase: String,
        suggestion: String,
        explanation: String,
    },
    NoErrors,
}

impl QuickCorrection {
    /// Classifies a raw policy reply.
    ///
    /// A missing, non-string or blank `incorrect_phrase` means `NoErrors`,
    /// whatever the other fields say.
    pub fn classify(value: &Value) -> Self {
        let phrase = value
            .get("incorrect_phrase")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty());

        match phrase {
            Some(phrase) => QuickCorrection::CorrectionFound {
                incorrect_phrase: phrase.to_string(),
                suggestion: string_field(value, "suggestion"),
                explanation: string_field(value, "explanation"),
            },
            None => QuickCorrection::NoErrors,
        }
    }

    pub fn is_correction(&self) -> bool {
        matches!(self, QuickCorrection::CorrectionFound { .. })
    }

    /// Wire status string.
    pub fn status(&self) -> &'static str {
        match self {
            QuickCorrection::CorrectionFound { .. } => "correction_found",
            QuickCorrection::NoErrors => "no_errors",
        }
    }

    /// Serialized form stored as the feedback message text.
    pub fn to_message_text(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{{\"status\":\"{}\"}}", self.status()))
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn populated_phrase_is_a_correction() {
        let c = QuickCorrection::classify(&json!({
            "incorrect_phrase": "I goed",
            "suggestion": "I went",
            "explanation": "Irregular past tense.",
            "status": "correction_found"
        }));
        assert_eq!(
            c,
            QuickCorrection::CorrectionFound {
                incorrect_phrase: "I goed".to_string(),
                suggestion: "I went".to_string(),
                explanation: "Irregular past tense.".to_string(),
            }
        );
    }

    #[test]
    fn missing_phrase_is_no_errors_even_with_other_fields() {
        let c = QuickCorrection::classify(&json!({
            "suggestion": "I went",
            "explanation": "x",
            "status": "correction_found"
        }));
        assert_eq!(c, QuickCorrection::NoErrors);
    }

    #[test]
    fn falsy_phrase_is_no_errors() {
        for v in [json!(""), json!("  "), json!(null), json!(false), json!(0)] {
            let c = QuickCorrection::classify(&json!({ "incorrect_phrase": v }));
            assert_eq!(c, QuickCorrection::NoErrors);
        }
    }

    #[test]
    fn message_text_carries_status_tag() {
        let text = QuickCorrection::NoErrors.to_message_text();
        assert_eq!(text, r#"{"status":"no_errors"}"#);

        let found = QuickCorrection::classify(&json!({"incorrect_phrase": "a"}));
        let value: Value = serde_json::from_str(&found.to_message_text()).unwrap();
        assert_eq!(value["status"], "correction_found");
        assert_eq!(value["incorrect_phrase"], "a");
    }

    proptest! {
        #[test]
        fn whitespace_phrase_never_counts(ws in "[ \t\n]{0,8}", suggestion in ".{0,20}") {
            let c = QuickCorrection::classify(&json!({
                "incorrect_phrase": ws,
                "suggestion": suggestion,
            }));
            prop_assert_eq!(c, QuickCorrection::NoErrors);
        }
    }
}
