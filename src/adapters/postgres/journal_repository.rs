//! PostgreSQL implementation of JournalRepository.
//!
//! Journals, their transcript and their images live in three tables linked
//! with `ON DELETE CASCADE`, so deleting a journal removes everything it owns.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::str::FromStr;

use super::column;
use crate::domain::foundation::{
    DomainError, ErrorCode, ImageId, JournalId, MessageId, Timestamp, UserId,
};
use crate::domain::journal::{
    ChatMessage, Journal, JournalImage, MessageType, Sender, WritingPhase,
};
use crate::ports::JournalRepository;

/// PostgreSQL implementation of JournalRepository.
#[derive(Clone)]
pub struct PostgresJournalRepository {
    pool: PgPool,
}

impl PostgresJournalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const JOURNAL_COLUMNS: &str = "id, user_id, journal_date, outline_content, content, \
     writing_phase, completion_metrics, created_at, updated_at";

const MESSAGE_COLUMNS: &str =
    "id, journal_id, sender, message_type, text, image_id, idempotency_key, created_at";

const IMAGE_COLUMNS: &str =
    "id, journal_id, storage_ref, ai_description, user_caption, created_at";

#[async_trait]
impl JournalRepository for PostgresJournalRepository {
    async fn create(&self, journal: &Journal) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO journals (
                id, user_id, journal_date, outline_content, content,
                writing_phase, completion_metrics, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(journal.id().as_uuid())
        .bind(journal.user_id().as_str())
        .bind(journal.date())
        .bind(journal.outline_content())
        .bind(journal.content())
        .bind(journal.writing_phase().as_str())
        .bind(journal.completion_metrics())
        .bind(journal.created_at().as_datetime())
        .bind(journal.updated_at().as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::new(
                    ErrorCode::JournalAlreadyExists,
                    format!("Journal already exists for {}", journal.date()),
                ))
            }
            Err(e) => Err(DomainError::database("Failed to insert journal", e)),
        }
    }

    async fn find_by_id(&self, id: &JournalId) -> Result<Option<Journal>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM journals WHERE id = $1", JOURNAL_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch journal", e))?;

        row.map(row_to_journal).transpose()
    }

    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM journals WHERE user_id = $1 AND journal_date = $2",
            JOURNAL_COLUMNS
        ))
        .bind(user_id.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch journal by date", e))?;

        row.map(row_to_journal).transpose()
    }

    async fn update(&self, journal: &Journal) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE journals SET
                outline_content = $2,
                content = $3,
                writing_phase = $4,
                completion_metrics = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(journal.id().as_uuid())
        .bind(journal.outline_content())
        .bind(journal.content())
        .bind(journal.writing_phase().as_str())
        .bind(journal.completion_metrics())
        .bind(journal.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update journal", e))?;

        if result.rows_affected() == 0 {
            return Err(journal_not_found(journal.id()));
        }
        Ok(())
    }

    async fn delete(&self, id: &JournalId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM journals WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to delete journal", e))?;

        if result.rows_affected() == 0 {
            return Err(journal_not_found(id));
        }
        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (
                id, journal_id, sender, message_type, text, image_id, idempotency_key, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id.as_uuid())
        .bind(message.journal_id.as_uuid())
        .bind(message.sender.as_str())
        .bind(message.message_type.as_str())
        .bind(&message.text)
        .bind(message.image_id.map(|id| *id.as_uuid()))
        .bind(message.idempotency_key.as_deref())
        .bind(message.created_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(journal_not_found(&message.journal_id))
            }
            Err(e) => Err(DomainError::database("Failed to insert message", e)),
        }
    }

    async fn messages(&self, journal_id: &JournalId) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM chat_messages WHERE journal_id = $1 ORDER BY created_at ASC, id ASC",
            MESSAGE_COLUMNS
        ))
        .bind(journal_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn count_conversation_messages(
        &self,
        journal_id: &JournalId,
    ) -> Result<u32, DomainError> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chat_messages WHERE journal_id = $1 AND message_type = 'conversation'",
        )
        .bind(journal_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to count messages", e))?;

        Ok(result.0 as u32)
    }

    async fn find_message_by_idempotency_key(
        &self,
        journal_id: &JournalId,
        key: &str,
    ) -> Result<Option<ChatMessage>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM chat_messages \
             WHERE journal_id = $1 AND idempotency_key = $2 AND sender = 'user'",
            MESSAGE_COLUMNS
        ))
        .bind(journal_id.as_uuid())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch message by idempotency key", e))?;

        row.map(row_to_message).transpose()
    }

    async fn add_image(&self, image: &JournalImage) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO journal_images (
                id, journal_id, storage_ref, ai_description, user_caption, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(image.id.as_uuid())
        .bind(image.journal_id.as_uuid())
        .bind(&image.storage_ref)
        .bind(image.ai_description.as_deref())
        .bind(image.user_caption.as_deref())
        .bind(image.created_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(journal_not_found(&image.journal_id))
            }
            Err(e) => Err(DomainError::database("Failed to insert image", e)),
        }
    }

    async fn find_image(&self, id: &ImageId) -> Result<Option<JournalImage>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM journal_images WHERE id = $1",
            IMAGE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch image", e))?;

        row.map(row_to_image).transpose()
    }

    async fn images(&self, journal_id: &JournalId) -> Result<Vec<JournalImage>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM journal_images WHERE journal_id = $1 ORDER BY created_at ASC",
            IMAGE_COLUMNS
        ))
        .bind(journal_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch images", e))?;

        rows.into_iter().map(row_to_image).collect()
    }

    async fn update_image_caption(&self, id: &ImageId, caption: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE journal_images SET user_caption = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(caption)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to update image caption", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ImageNotFound,
                format!("Image not found: {}", id),
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn journal_not_found(id: &JournalId) -> DomainError {
    DomainError::new(ErrorCode::JournalNotFound, format!("Journal not found: {}", id))
}

fn row_to_journal(row: PgRow) -> Result<Journal, DomainError> {
    let user_id: String = column(&row, "user_id")?;
    let phase: String = column(&row, "writing_phase")?;
    let created_at: DateTime<Utc> = column(&row, "created_at")?;
    let updated_at: DateTime<Utc> = column(&row, "updated_at")?;

    Ok(Journal::reconstitute(
        JournalId::from_uuid(column(&row, "id")?),
        UserId::new(user_id).map_err(|e| DomainError::database("Invalid user_id", e))?,
        column(&row, "journal_date")?,
        column(&row, "outline_content")?,
        column(&row, "content")?,
        WritingPhase::from_str(&phase)
            .map_err(|e| DomainError::database("Invalid writing_phase", e))?,
        column(&row, "completion_metrics")?,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
    ))
}

fn str_to_sender(s: &str) -> Result<Sender, DomainError> {
    match s {
        "user" => Ok(Sender::User),
        "ai" => Ok(Sender::Ai),
        other => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid sender: {}", other),
        )),
    }
}

fn row_to_message(row: PgRow) -> Result<ChatMessage, DomainError> {
    let sender: String = column(&row, "sender")?;
    let message_type: String = column(&row, "message_type")?;
    let image_id: Option<uuid::Uuid> = column(&row, "image_id")?;
    let created_at: DateTime<Utc> = column(&row, "created_at")?;

    Ok(ChatMessage {
        id: MessageId::from_uuid(column(&row, "id")?),
        journal_id: JournalId::from_uuid(column(&row, "journal_id")?),
        sender: str_to_sender(&sender)?,
        message_type: MessageType::parse(&message_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid message_type: {}", message_type),
            )
        })?,
        text: column(&row, "text")?,
        image_id: image_id.map(ImageId::from_uuid),
        idempotency_key: column(&row, "idempotency_key")?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

fn row_to_image(row: PgRow) -> Result<JournalImage, DomainError> {
    let created_at: DateTime<Utc> = column(&row, "created_at")?;

    Ok(JournalImage {
        id: ImageId::from_uuid(column(&row, "id")?),
        journal_id: JournalId::from_uuid(column(&row, "journal_id")?),
        storage_ref: column(&row, "storage_ref")?,
        ai_description: column(&row, "ai_description")?,
        user_caption: column(&row, "user_caption")?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_round_trips_through_column_text() {
        for sender in [Sender::User, Sender::Ai] {
            assert_eq!(str_to_sender(sender.as_str()).unwrap(), sender);
        }
        assert_eq!(
            str_to_sender("robot").unwrap_err().code,
            ErrorCode::DatabaseError
        );
    }

    #[test]
    fn column_lists_match_select_shape() {
        assert_eq!(JOURNAL_COLUMNS.split(',').count(), 9);
        assert_eq!(MESSAGE_COLUMNS.split(',').count(), 8);
        assert_eq!(IMAGE_COLUMNS.split(',').count(), 6);
    }
}
