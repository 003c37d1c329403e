//! In-memory error ledger repository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, TopicId, UserErrorId, UserId};
use crate::domain::ledger::{
    LearningPoint, LearningTopic, ProgressSummary, UserError, UserLearningHistory,
};
use crate::ports::ErrorLedgerRepository;

#[derive(Default)]
struct State {
    topics: Vec<LearningTopic>,
    errors: HashMap<UserErrorId, UserError>,
    points: Vec<LearningPoint>,
    history: Vec<UserLearningHistory>,
}

/// In-memory implementation of the ErrorLedgerRepository port.
///
/// Every keyed write holds the single write lock for its whole lookup and
/// insert, so concurrent callers cannot both miss.
#[derive(Default)]
pub struct InMemoryErrorLedger {
    state: RwLock<State>,
}

impl InMemoryErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot counts `(topics, errors, points, history)` for assertions.
    pub async fn counts(&self) -> (usize, usize, usize, usize) {
        let s = self.state.read().await;
        (s.topics.len(), s.errors.len(), s.points.len(), s.history.len())
    }

    /// All error rows of a user.
    pub async fn errors_for_user(&self, user_id: &UserId) -> Vec<UserError> {
        self.state
            .read()
            .await
            .errors
            .values()
            .filter(|e| &e.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ErrorLedgerRepository for InMemoryErrorLedger {
    async fn get_or_create_topic(&self, name: &str) -> Result<LearningTopic, DomainError> {
        let mut state = self.state.write().await;
        if let Some(topic) = state.topics.iter().find(|t| t.name == name) {
            return Ok(topic.clone());
        }
        let topic = LearningTopic::new(name);
        state.topics.push(topic.clone());
        Ok(topic)
    }

    async fn record_error_occurrence(
        &self,
        user_id: &UserId,
        topic_id: &TopicId,
        incorrect_phrase: &str,
        now: Timestamp,
    ) -> Result<UserError, DomainError> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.errors.values_mut().find(|e| {
            &e.user_id == user_id && &e.topic_id == topic_id && e.incorrect_phrase == incorrect_phrase
        }) {
            existing.record_recurrence(now);
            return Ok(existing.clone());
        }
        let error = UserError::first_occurrence(user_id.clone(), *topic_id, incorrect_phrase, now);
        state.errors.insert(error.id, error.clone());
        Ok(error)
    }

    async fn get_or_create_learning_point(
        &self,
        topic_id: &TopicId,
        explanation_text: &str,
        suggestion_text: &str,
    ) -> Result<LearningPoint, DomainError> {
        let mut state = self.state.write().await;
        if let Some(point) = state
            .points
            .iter()
            .find(|p| &p.topic_id == topic_id && p.explanation_text == explanation_text)
        {
            return Ok(point.clone());
        }
        let point = LearningPoint::new(*topic_id, explanation_text, suggestion_text);
        state.points.push(point.clone());
        Ok(point)
    }

    async fn append_history(&self, entry: &UserLearningHistory) -> Result<(), DomainError> {
        self.state.write().await.history.push(entry.clone());
        Ok(())
    }

    async fn progress_summary(&self, user_id: &UserId) -> Result<ProgressSummary, DomainError> {
        let state = self.state.read().await;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for error in state.errors.values().filter(|e| &e.user_id == user_id) {
            let name = state
                .topics
                .iter()
                .find(|t| t.id == error.topic_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| error.topic_id.to_string());
            *counts.entry(name).or_default() += u64::from(error.repetition_count);
        }
        Ok(ProgressSummary::from_counts(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn topic_get_or_create_is_idempotent() {
        let ledger = InMemoryErrorLedger::new();
        let a = ledger.get_or_create_topic("Grammar").await.unwrap();
        let b = ledger.get_or_create_topic("Grammar").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(ledger.counts().await.0, 1);
    }

    #[tokio::test]
    async fn learning_point_keyed_by_topic_and_explanation() {
        let ledger = InMemoryErrorLedger::new();
        let t = ledger.get_or_create_topic("Grammar").await.unwrap();
        let p1 = ledger
            .get_or_create_learning_point(&t.id, "Use past tense", "went")
            .await
            .unwrap();
        let p2 = ledger
            .get_or_create_learning_point(&t.id, "Use past tense", "other")
            .await
            .unwrap();
        let p3 = ledger
            .get_or_create_learning_point(&t.id, "Different", "went")
            .await
            .unwrap();
        assert_eq!(p1.id, p2.id);
        assert_ne!(p1.id, p3.id);
    }

    #[tokio::test]
    async fn progress_sums_repetitions_per_topic() {
        let ledger = InMemoryErrorLedger::new();
        let user = UserId::new("u").unwrap();
        let grammar = ledger.get_or_create_topic("Grammar").await.unwrap();
        let spelling = ledger.get_or_create_topic("Spelling").await.unwrap();
        let now = Timestamp::now();

        for _ in 0..2 {
            ledger
                .record_error_occurrence(&user, &grammar.id, "he go", now)
                .await
                .unwrap();
        }
        ledger
            .record_error_occurrence(&user, &spelling.id, "recieve", now)
            .await
            .unwrap();
        ledger
            .record_error_occurrence(&UserId::new("other").unwrap(), &spelling.id, "x", now)
            .await
            .unwrap();

        let summary = ledger.progress_summary(&user).await.unwrap();

        assert_eq!(summary.total_errors, 3);
        assert_eq!(summary.topics_encountered, 2);
        assert_eq!(summary.topics[0].topic, "Grammar");
    }

    #[tokio::test]
    async fn recurrence_keeps_first_occurrence_and_bumps_last() {
        let ledger = InMemoryErrorLedger::new();
        let user = UserId::new("u").unwrap();
        let topic = ledger.get_or_create_topic("Grammar").await.unwrap();
        let t0 = Timestamp::now();

        let first = ledger
            .record_error_occurrence(&user, &topic.id, "he go", t0)
            .await
            .unwrap();
        let second = ledger
            .record_error_occurrence(&user, &topic.id, "he go", t0.plus_millis(500))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.repetition_count, 2);
        assert_eq!(second.first_occurred_at, t0);
        assert_eq!(second.last_occurred_at, t0.plus_millis(500));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_occurrences_converge_on_one_row() {
        let ledger = Arc::new(InMemoryErrorLedger::new());
        let user = UserId::new("u").unwrap();
        let topic_id = ledger.get_or_create_topic("Grammar").await.unwrap().id;

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let ledger = ledger.clone();
                let user = user.clone();
                tokio::spawn(async move {
                    ledger
                        .record_error_occurrence(&user, &topic_id, "he go", Timestamp::now())
                        .await
                        .unwrap()
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let errors = ledger.errors_for_user(&user).await;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].repetition_count, 16);
    }
}
