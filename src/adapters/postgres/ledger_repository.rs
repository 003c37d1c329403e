//! PostgreSQL implementation of ErrorLedgerRepository.
//!
//! Topics and learning points use `INSERT .. ON CONFLICT DO NOTHING` followed
//! by a select on the natural key. Error occurrences are one upsert on
//! `(user_id, topic_id, incorrect_phrase)` that bumps the count in place.
//! Concurrent submissions converge on one row either way.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::column;
use crate::domain::foundation::{
    DomainError, LearningPointId, Timestamp, TopicId, UserErrorId, UserId,
};
use crate::domain::ledger::{
    LearningPoint, LearningTopic, ProgressSummary, UserError, UserErrorStatus,
    UserLearningHistory,
};
use crate::ports::ErrorLedgerRepository;

/// PostgreSQL implementation of ErrorLedgerRepository.
#[derive(Clone)]
pub struct PostgresErrorLedger {
    pool: PgPool,
}

impl PostgresErrorLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorLedgerRepository for PostgresErrorLedger {
    async fn get_or_create_topic(&self, name: &str) -> Result<LearningTopic, DomainError> {
        let candidate = LearningTopic::new(name);
        sqlx::query(
            "INSERT INTO learning_topics (id, name, description) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(candidate.id.as_uuid())
        .bind(&candidate.name)
        .bind(candidate.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert learning topic", e))?;

        let row = sqlx::query("SELECT id, name, description FROM learning_topics WHERE name = $1")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch learning topic", e))?;

        Ok(LearningTopic {
            id: TopicId::from_uuid(column(&row, "id")?),
            name: column(&row, "name")?,
            description: column(&row, "description")?,
        })
    }

    async fn record_error_occurrence(
        &self,
        user_id: &UserId,
        topic_id: &TopicId,
        incorrect_phrase: &str,
        now: Timestamp,
    ) -> Result<UserError, DomainError> {
        let candidate = UserError::first_occurrence(user_id.clone(), *topic_id, incorrect_phrase, now);
        let row = sqlx::query(
            r#"
            INSERT INTO user_errors (
                id, user_id, topic_id, incorrect_phrase, repetition_count, status,
                first_occurred_at, last_occurred_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, topic_id, incorrect_phrase) DO UPDATE SET
                repetition_count = user_errors.repetition_count + 1,
                status = EXCLUDED.status,
                last_occurred_at = EXCLUDED.last_occurred_at
            RETURNING id, user_id, topic_id, incorrect_phrase, repetition_count, status,
                      first_occurred_at, last_occurred_at
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.user_id.as_str())
        .bind(candidate.topic_id.as_uuid())
        .bind(&candidate.incorrect_phrase)
        .bind(candidate.repetition_count as i32)
        .bind(candidate.status.as_str())
        .bind(candidate.first_occurred_at.as_datetime())
        .bind(candidate.last_occurred_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to record user error", e))?;

        row_to_user_error(row)
    }

    async fn get_or_create_learning_point(
        &self,
        topic_id: &TopicId,
        explanation_text: &str,
        suggestion_text: &str,
    ) -> Result<LearningPoint, DomainError> {
        let candidate = LearningPoint::new(*topic_id, explanation_text, suggestion_text);
        sqlx::query(
            "INSERT INTO learning_points (id, topic_id, explanation_text, suggestion_text) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (topic_id, explanation_text) DO NOTHING",
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.topic_id.as_uuid())
        .bind(&candidate.explanation_text)
        .bind(&candidate.suggestion_text)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert learning point", e))?;

        let row = sqlx::query(
            "SELECT id, topic_id, explanation_text, suggestion_text FROM learning_points \
             WHERE topic_id = $1 AND explanation_text = $2",
        )
        .bind(topic_id.as_uuid())
        .bind(explanation_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch learning point", e))?;

        Ok(LearningPoint {
            id: LearningPointId::from_uuid(column(&row, "id")?),
            topic_id: TopicId::from_uuid(column(&row, "topic_id")?),
            explanation_text: column(&row, "explanation_text")?,
            suggestion_text: column(&row, "suggestion_text")?,
        })
    }

    async fn append_history(&self, entry: &UserLearningHistory) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO user_learning_history (id, error_id, learning_point_id, occurred_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.error_id.as_uuid())
        .bind(entry.learning_point_id.as_uuid())
        .bind(entry.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to append learning history", e))?;

        Ok(())
    }

    async fn progress_summary(&self, user_id: &UserId) -> Result<ProgressSummary, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT t.name AS topic, SUM(e.repetition_count)::BIGINT AS error_count
            FROM user_errors e
            JOIN learning_topics t ON t.id = e.topic_id
            WHERE e.user_id = $1
            GROUP BY t.name
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to compute progress summary", e))?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let topic: String = row
                .try_get("topic")
                .map_err(|e| DomainError::database("Failed to get topic", e))?;
            let count: i64 = row
                .try_get("error_count")
                .map_err(|e| DomainError::database("Failed to get error_count", e))?;
            counts.push((topic, count.max(0) as u64));
        }
        Ok(ProgressSummary::from_counts(counts))
    }
}

fn row_to_user_error(row: PgRow) -> Result<UserError, DomainError> {
    let user_id: String = column(&row, "user_id")?;
    let repetition_count: i32 = column(&row, "repetition_count")?;
    let status: String = column(&row, "status")?;
    let first: DateTime<Utc> = column(&row, "first_occurred_at")?;
    let last: DateTime<Utc> = column(&row, "last_occurred_at")?;

    Ok(UserError {
        id: UserErrorId::from_uuid(column(&row, "id")?),
        user_id: UserId::new(user_id).map_err(|e| DomainError::database("Invalid user_id", e))?,
        topic_id: TopicId::from_uuid(column(&row, "topic_id")?),
        incorrect_phrase: column(&row, "incorrect_phrase")?,
        repetition_count: repetition_count.max(0) as u32,
        status: UserErrorStatus::parse(&status),
        first_occurred_at: Timestamp::from_datetime(first),
        last_occurred_at: Timestamp::from_datetime(last),
    })
}
