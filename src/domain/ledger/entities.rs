//! Error ledger entities.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    HistoryId, LearningPointId, Timestamp, TopicId, UserErrorId, UserId,
};

/// A category of mistake, such as "Grammar: Verb Tense". Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningTopic {
    pub id: TopicId,
    pub name: String,
    pub description: Option<String>,
}

impl LearningTopic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TopicId::new(),
            name: name.into(),
            description: None,
        }
    }
}

/// Lifecycle marker of a tracked error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserErrorStatus {
    Active,
    Resolved,
}

impl UserErrorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserErrorStatus::Active => "active",
            UserErrorStatus::Resolved => "resolved",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "resolved" => UserErrorStatus::Resolved,
            _ => UserErrorStatus::Active,
        }
    }
}

/// One distinct mistake a user has made, unique per (user, topic, phrase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    pub id: UserErrorId,
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub incorrect_phrase: String,
    pub repetition_count: u32,
    pub status: UserErrorStatus,
    pub first_occurred_at: Timestamp,
    pub last_occurred_at: Timestamp,
}

impl UserError {
    /// First sighting of an error.
    pub fn first_occurrence(
        user_id: UserId,
        topic_id: TopicId,
        incorrect_phrase: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: UserErrorId::new(),
            user_id,
            topic_id,
            incorrect_phrase: incorrect_phrase.into(),
            repetition_count: 1,
            status: UserErrorStatus::Active,
            first_occurred_at: now,
            last_occurred_at: now,
        }
    }

    /// Counts another occurrence of the same error.
    pub fn record_recurrence(&mut self, now: Timestamp) {
        self.repetition_count = self.repetition_count.saturating_add(1);
        self.last_occurred_at = now;
        self.status = UserErrorStatus::Active;
    }
}

/// Reusable explanation of how to fix a kind of mistake within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningPoint {
    pub id: LearningPointId,
    pub topic_id: TopicId,
    pub explanation_text: String,
    pub suggestion_text: String,
}

impl LearningPoint {
    pub fn new(
        topic_id: TopicId,
        explanation_text: impl Into<String>,
        suggestion_text: impl Into<String>,
    ) -> Self {
        Self {
            id: LearningPointId::new(),
            topic_id,
            explanation_text: explanation_text.into(),
            suggestion_text: suggestion_text.into(),
        }
    }
}

/// Append-only record that an error occurred and which point explained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLearningHistory {
    pub id: HistoryId,
    pub error_id: UserErrorId,
    pub learning_point_id: LearningPointId,
    pub occurred_at: Timestamp,
}

impl UserLearningHistory {
    pub fn new(error_id: UserErrorId, learning_point_id: LearningPointId, now: Timestamp) -> Self {
        Self {
            id: HistoryId::new(),
            error_id,
            learning_point_id,
            occurred_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_starts_at_one() {
        let now = Timestamp::now();
        let e = UserError::first_occurrence(UserId::new("u").unwrap(), TopicId::new(), "I goed", now);
        assert_eq!(e.repetition_count, 1);
        assert_eq!(e.first_occurred_at, now);
        assert_eq!(e.last_occurred_at, now);
        assert_eq!(e.status, UserErrorStatus::Active);
    }

    #[test]
    fn recurrence_increments_and_refreshes_timestamp() {
        let t0 = Timestamp::now();
        let mut e = UserError::first_occurrence(UserId::new("u").unwrap(), TopicId::new(), "x", t0);
        let t1 = t0.plus_millis(1000);

        e.record_recurrence(t1);

        assert_eq!(e.repetition_count, 2);
        assert_eq!(e.first_occurred_at, t0);
        assert_eq!(e.last_occurred_at, t1);
    }

    #[test]
    fn status_parses_unknown_as_active() {
        assert_eq!(UserErrorStatus::parse("resolved"), UserErrorStatus::Resolved);
        assert_eq!(UserErrorStatus::parse("weird"), UserErrorStatus::Active);
    }
}
