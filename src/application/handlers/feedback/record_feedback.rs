//! RecordFeedbackHandler - folds evaluation feedback into the error ledger.
//!
//! For each item, in order: get-or-create the topic, record an occurrence of
//! the user error (bumping its repetition count when it already exists),
//! get-or-create the learning point, then append a history row. History is
//! never deduplicated.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::ledger::{
    FeedbackItem, LearningPoint, LearningTopic, UserError, UserLearningHistory,
};
use crate::ports::ErrorLedgerRepository;

/// Command carrying one batch of feedback for a user.
#[derive(Debug, Clone)]
pub struct RecordFeedbackCommand {
    pub user_id: UserId,
    pub items: Vec<FeedbackItem>,
}

/// Ledger rows touched by one feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub topic: LearningTopic,
    pub error: UserError,
    pub learning_point: LearningPoint,
    pub history: UserLearningHistory,
}

pub struct RecordFeedbackHandler {
    ledger: Arc<dyn ErrorLedgerRepository>,
}

impl RecordFeedbackHandler {
    pub fn new(ledger: Arc<dyn ErrorLedgerRepository>) -> Self {
        Self { ledger }
    }

    /// Records every valid item; invalid ones are logged and skipped.
    ///
    /// Items are processed strictly in order so a phrase repeated within
    /// one batch counts twice.
    pub async fn handle(&self, cmd: RecordFeedbackCommand) -> Result<Vec<LedgerEntry>, DomainError> {
        let mut entries = Vec::with_capacity(cmd.items.len());
        for (index, item) in cmd.items.iter().enumerate() {
            if let Err(e) = item.validate() {
                warn!(user_id = %cmd.user_id, index, error = %e, "Skipping invalid feedback item");
                continue;
            }
            entries.push(self.record_item(&cmd.user_id, item).await?);
        }
        debug!(user_id = %cmd.user_id, recorded = entries.len(), "Feedback recorded");
        Ok(entries)
    }

    async fn record_item(
        &self,
        user_id: &UserId,
        item: &FeedbackItem,
    ) -> Result<LedgerEntry, DomainError> {
        let now = Timestamp::now();
        let category = item.category.trim();
        let phrase = item.incorrect_phrase.trim();

        // 1. Topic
        let topic = self.ledger.get_or_create_topic(category).await?;

        // 2. User error, inserted or bumped in one step
        let error = self
            .ledger
            .record_error_occurrence(user_id, &topic.id, phrase, now)
            .await?;

        // 3. Learning point
        let learning_point = self
            .ledger
            .get_or_create_learning_point(&topic.id, item.explanation.trim(), item.suggestion.trim())
            .await?;

        // 4. History, always appended
        let history = UserLearningHistory::new(error.id, learning_point.id, now);
        self.ledger.append_history(&history).await?;

        Ok(LedgerEntry {
            topic,
            error,
            learning_point,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryErrorLedger;
    use crate::domain::foundation::TopicId;
    use crate::domain::ledger::ProgressSummary;
    use async_trait::async_trait;

    /// Yields to the scheduler before every call, like a networked store.
    struct YieldingLedger(Arc<InMemoryErrorLedger>);

    #[async_trait]
    impl ErrorLedgerRepository for YieldingLedger {
        async fn get_or_create_topic(&self, name: &str) -> Result<LearningTopic, DomainError> {
            tokio::task::yield_now().await;
            self.0.get_or_create_topic(name).await
        }

        async fn record_error_occurrence(
            &self,
            user_id: &UserId,
            topic_id: &TopicId,
            incorrect_phrase: &str,
            now: Timestamp,
        ) -> Result<UserError, DomainError> {
            tokio::task::yield_now().await;
            self.0
                .record_error_occurrence(user_id, topic_id, incorrect_phrase, now)
                .await
        }

        async fn get_or_create_learning_point(
            &self,
            topic_id: &TopicId,
            explanation_text: &str,
            suggestion_text: &str,
        ) -> Result<LearningPoint, DomainError> {
            tokio::task::yield_now().await;
            self.0
                .get_or_create_learning_point(topic_id, explanation_text, suggestion_text)
                .await
        }

        async fn append_history(&self, entry: &UserLearningHistory) -> Result<(), DomainError> {
            tokio::task::yield_now().await;
            self.0.append_history(entry).await
        }

        async fn progress_summary(&self, user_id: &UserId) -> Result<ProgressSummary, DomainError> {
            self.0.progress_summary(user_id).await
        }
    }

    fn item(category: &str, phrase: &str, explanation: &str) -> FeedbackItem {
        FeedbackItem::new(category, phrase, "fixed", explanation)
    }

    fn command(items: Vec<FeedbackItem>) -> RecordFeedbackCommand {
        RecordFeedbackCommand {
            user_id: UserId::new("learner").unwrap(),
            items,
        }
    }

    #[tokio::test]
    async fn same_item_twice_dedupes_entities_but_appends_history() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(ledger.clone());
        let fb = item("Grammar", "he go", "Third person takes -s.");

        let first = handler.handle(command(vec![fb.clone()])).await.unwrap();
        let second = handler.handle(command(vec![fb])).await.unwrap();

        assert_eq!(ledger.counts().await, (1, 1, 1, 2));
        assert_eq!(first[0].error.id, second[0].error.id);
        assert_eq!(second[0].error.repetition_count, 2);
        assert!(!second[0]
            .error
            .last_occurred_at
            .is_before(&first[0].error.last_occurred_at));
        assert_eq!(
            second[0].error.first_occurred_at,
            first[0].error.first_occurred_at
        );
    }

    #[tokio::test]
    async fn repeated_phrase_within_one_batch_counts_twice() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(ledger.clone());
        let fb = item("Spelling", "recieve", "i before e");

        let entries = handler.handle(command(vec![fb.clone(), fb])).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].error.repetition_count, 2);
        assert_eq!(ledger.counts().await, (1, 1, 1, 2));
    }

    #[tokio::test]
    async fn distinct_explanations_create_distinct_points() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(ledger.clone());

        handler
            .handle(command(vec![
                item("Grammar", "he go", "Third person takes -s."),
                item("Grammar", "she have", "Use 'has' with she."),
            ]))
            .await
            .unwrap();

        assert_eq!(ledger.counts().await, (1, 2, 2, 2));
    }

    #[tokio::test]
    async fn errors_are_scoped_per_user() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(ledger.clone());
        let fb = item("Grammar", "he go", "x");

        handler.handle(command(vec![fb.clone()])).await.unwrap();
        handler
            .handle(RecordFeedbackCommand {
                user_id: UserId::new("other").unwrap(),
                items: vec![fb],
            })
            .await
            .unwrap();

        let (_, errors, _, _) = ledger.counts().await;
        assert_eq!(errors, 2);
        let mine = ledger
            .errors_for_user(&UserId::new("learner").unwrap())
            .await;
        assert_eq!(mine[0].repetition_count, 1);
    }

    #[tokio::test]
    async fn invalid_items_are_skipped() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(ledger.clone());

        let entries = handler
            .handle(command(vec![
                item("", "x", "y"),
                item("Grammar", "  ", "y"),
                item("Grammar", "he go", "y"),
            ]))
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(ledger.counts().await, (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn interleaved_submissions_share_one_error_row() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let handler = RecordFeedbackHandler::new(Arc::new(YieldingLedger(ledger.clone())));
        let fb = item("Grammar", "he go", "Third person takes -s.");

        let (a, b) = tokio::join!(
            handler.handle(command(vec![fb.clone()])),
            handler.handle(command(vec![fb])),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(ledger.counts().await, (1, 1, 1, 2));
        assert_eq!(a[0].error.id, b[0].error.id);
        let mut counts = vec![a[0].error.repetition_count, b[0].error.repetition_count];
        counts.sort();
        assert_eq!(counts, vec![1, 2]);
        let stored = ledger
            .errors_for_user(&UserId::new("learner").unwrap())
            .await;
        assert_eq!(stored[0].repetition_count, 2);
    }
}
