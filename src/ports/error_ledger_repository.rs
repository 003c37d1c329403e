//! Error ledger repository port.
//!
//! Every keyed write is a single atomic operation: concurrent callers on the
//! same key converge on one row instead of racing a lookup against an insert.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, TopicId, UserId};
use crate::domain::ledger::{
    LearningPoint, LearningTopic, ProgressSummary, UserError, UserLearningHistory,
};

/// Repository port for topics, errors, learning points and history.
#[async_trait]
pub trait ErrorLedgerRepository: Send + Sync {
    /// Return the topic with this name, creating it if absent.
    async fn get_or_create_topic(&self, name: &str) -> Result<LearningTopic, DomainError>;

    /// Count one occurrence of the error keyed by (user, topic, phrase).
    ///
    /// Inserts it with `repetition_count = 1` when absent, otherwise bumps the
    /// count and `last_occurred_at`. Returns the row as stored.
    async fn record_error_occurrence(
        &self,
        user_id: &UserId,
        topic_id: &TopicId,
        incorrect_phrase: &str,
        now: Timestamp,
    ) -> Result<UserError, DomainError>;

    /// Return the point keyed by (topic, explanation), creating it if absent.
    async fn get_or_create_learning_point(
        &self,
        topic_id: &TopicId,
        explanation_text: &str,
        suggestion_text: &str,
    ) -> Result<LearningPoint, DomainError>;

    /// Append one occurrence row. Never deduplicated.
    async fn append_history(&self, entry: &UserLearningHistory) -> Result<(), DomainError>;

    /// Per-topic totals of a user's errors.
    async fn progress_summary(&self, user_id: &UserId) -> Result<ProgressSummary, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_ledger_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ErrorLedgerRepository) {}
    }
}
