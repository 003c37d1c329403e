//! Tagged actions returned by the scaffolding policy.
//!
//! The policy replies with `{"action": TAG, "payload": {...}}`. Parsing is
//! total: anything that does not match a known shape becomes
//! [`CoachAction::Unrecognized`] so the dispatcher can degrade gracefully.

use serde_json::Value;

/// Flavor of question the coach asked. All map to the same effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Ask,
    ProbeTopic,
    SuggestBranch,
    AskGeneral,
}

/// Closed set of effects the coach may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoachAction {
    AskQuestion {
        kind: QuestionKind,
        question: String,
    },
    AddToOutline {
        text_to_add: String,
        follow_up_question: String,
    },
    SuggestTopics {
        intro: String,
        topics: Vec<String>,
    },
    Unrecognized {
        tag: Option<String>,
        reason: String,
    },
}

impl CoachAction {
    /// Builds a plain question action.
    pub fn ask(question: impl Into<String>) -> Self {
        CoachAction::AskQuestion {
            kind: QuestionKind::Ask,
            question: question.into(),
        }
    }

    fn unrecognized(tag: Option<&str>, reason: impl Into<String>) -> Self {
        CoachAction::Unrecognized {
            tag: tag.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Interprets an action envelope. Never fails.
    pub fn from_json(value: &Value) -> Self {
        let raw_tag = match value.get("action").and_then(Value::as_str) {
            Some(tag) => tag,
            None => return Self::unrecognized(None, "missing action tag"),
        };
        let tag = raw_tag.trim().to_ascii_uppercase();
        let payload = value.get("payload").unwrap_or(&Value::Null);

        let kind = match tag.as_str() {
            "ASK_QUESTION" => Some(QuestionKind::Ask),
            "PROBE_TOPIC" => Some(QuestionKind::ProbeTopic),
            "SUGGEST_BRANCH" => Some(QuestionKind::SuggestBranch),
            "ASK_GENERAL_QUESTION" => Some(QuestionKind::AskGeneral),
            _ => None,
        };
        if let Some(kind) = kind {
            return match non_blank(payload, "question") {
                Some(question) => CoachAction::AskQuestion { kind, question },
                None => Self::unrecognized(Some(raw_tag), "question payload missing"),
            };
        }

        match tag.as_str() {
            "ADD_TO_OUTLINE" => {
                let text = payload.get("text_to_add").and_then(Value::as_str);
                match (text, non_blank(payload, "follow_up_question")) {
                    (Some(text), Some(follow_up)) if !text.is_empty() => CoachAction::AddToOutline {
                        text_to_add: text.to_string(),
                        follow_up_question: follow_up,
                    },
                    _ => Self::unrecognized(Some(raw_tag), "outline payload incomplete"),
                }
            }
            "SUGGEST_TOPICS" => {
                let intro = non_blank(payload, "intro").unwrap_or_default();
                let topics: Vec<String> = payload
                    .get("topics")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                if intro.is_empty() && topics.is_empty() {
                    Self::unrecognized(Some(raw_tag), "topic payload empty")
                } else {
                    CoachAction::SuggestTopics { intro, topics }
                }
            }
            _ => Self::unrecognized(Some(raw_tag), "unknown action tag"),
        }
    }

    /// Tag name used in logs.
    pub fn tag(&self) -> &str {
        match self {
            CoachAction::AskQuestion { kind, .. } => match kind {
                QuestionKind::Ask => "ASK_QUESTION",
                QuestionKind::ProbeTopic => "PROBE_TOPIC",
                QuestionKind::SuggestBranch => "SUGGEST_BRANCH",
                QuestionKind::AskGeneral => "ASK_GENERAL_QUESTION",
            },
            CoachAction::AddToOutline { .. } => "ADD_TO_OUTLINE",
            CoachAction::SuggestTopics { .. } => "SUGGEST_TOPICS",
            CoachAction::Unrecognized { .. } => "UNRECOGNIZED",
        }
    }
}

fn non_blank(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ask_question() {
        let action = CoachAction::from_json(&json!({
            "action": "ASK_QUESTION",
            "payload": {"question": "What did you eat?"}
        }));
        assert_eq!(action, CoachAction::ask("What did you eat?"));
    }

    #[test]
    fn question_variants_are_accepted_case_insensitively() {
        let action = CoachAction::from_json(&json!({
            "action": " probe_topic ",
            "payload": {"question": "Why?"}
        }));
        assert_eq!(
            action,
            CoachAction::AskQuestion {
                kind: QuestionKind::ProbeTopic,
                question: "Why?".to_string()
            }
        );
        assert_eq!(action.tag(), "PROBE_TOPIC");
    }

    #[test]
    fn add_to_outline_keeps_text_verbatim() {
        let action = CoachAction::from_json(&json!({
            "action": "ADD_TO_OUTLINE",
            "payload": {"text_to_add": "\n- Coffee", "follow_up_question": "How was it?"}
        }));
        assert_eq!(
            action,
            CoachAction::AddToOutline {
                text_to_add: "\n- Coffee".to_string(),
                follow_up_question: "How was it?".to_string()
            }
        );
    }

    #[test]
    fn add_to_outline_without_follow_up_is_unrecognized() {
        let action = CoachAction::from_json(&json!({
            "action": "ADD_TO_OUTLINE",
            "payload": {"text_to_add": "x"}
        }));
        assert!(matches!(action, CoachAction::Unrecognized { .. }));
    }

    #[test]
    fn suggest_topics_drops_blank_topics() {
        let action = CoachAction::from_json(&json!({
            "action": "SUGGEST_TOPICS",
            "payload": {"intro": "Ideas:", "topics": ["Work", " ", 3, "Food"]}
        }));
        assert_eq!(
            action,
            CoachAction::SuggestTopics {
                intro: "Ideas:".to_string(),
                topics: vec!["Work".to_string(), "Food".to_string()]
            }
        );
    }

    #[test]
    fn unknown_and_missing_tags_are_unrecognized() {
        match CoachAction::from_json(&json!({"action": "DANCE"})) {
            CoachAction::Unrecognized { tag, .. } => assert_eq!(tag.as_deref(), Some("DANCE")),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
        match CoachAction::from_json(&json!({"payload": {}})) {
            CoachAction::Unrecognized { tag, .. } => assert!(tag.is_none()),
            other => panic!("expected Unrecognized, got {:?}", other),
        }
        assert!(matches!(
            CoachAction::from_json(&json!([1, 2])),
            CoachAction::Unrecognized { .. }
        ));
    }
}
