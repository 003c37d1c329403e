//! Journal repository port.
//!
//! Persists journals together with their transcripts and images. A journal
//! exclusively owns its messages and images: deleting it removes them.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, ImageId, JournalId, UserId};
use crate::domain::journal::{ChatMessage, Journal, JournalImage};

/// Repository port for journals, transcripts and images.
#[async_trait]
pub trait JournalRepository: Send + Sync {
    /// Insert a new journal.
    ///
    /// # Errors
    ///
    /// - `JournalAlreadyExists` if the user already has a journal for that date
    /// - `DatabaseError` on persistence failure
    async fn create(&self, journal: &Journal) -> Result<(), DomainError>;

    /// Find a journal by its ID.
    async fn find_by_id(&self, id: &JournalId) -> Result<Option<Journal>, DomainError>;

    /// Find the user's journal for a calendar date.
    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, DomainError>;

    /// Persist outline, draft, phase and metrics of an existing journal.
    ///
    /// # Errors
    ///
    /// - `JournalNotFound` if the journal doesn't exist
    async fn update(&self, journal: &Journal) -> Result<(), DomainError>;

    /// Delete a journal with its messages and images.
    ///
    /// # Errors
    ///
    /// - `JournalNotFound` if the journal doesn't exist
    async fn delete(&self, id: &JournalId) -> Result<(), DomainError>;

    /// Append a message to the transcript.
    ///
    /// # Errors
    ///
    /// - `JournalNotFound` if the journal doesn't exist
    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError>;

    /// Transcript in ascending creation order.
    async fn messages(&self, journal_id: &JournalId) -> Result<Vec<ChatMessage>, DomainError>;

    /// Number of conversation-type messages (the turn-cap quantity).
    async fn count_conversation_messages(&self, journal_id: &JournalId)
        -> Result<u32, DomainError>;

    /// Find a user message previously stored with this idempotency key.
    async fn find_message_by_idempotency_key(
        &self,
        journal_id: &JournalId,
        key: &str,
    ) -> Result<Option<ChatMessage>, DomainError>;

    /// Store a new image record.
    ///
    /// # Errors
    ///
    /// - `JournalNotFound` if the owning journal doesn't exist
    async fn add_image(&self, image: &JournalImage) -> Result<(), DomainError>;

    /// Find an image by ID.
    async fn find_image(&self, id: &ImageId) -> Result<Option<JournalImage>, DomainError>;

    /// All images of a journal in upload order.
    async fn images(&self, journal_id: &JournalId) -> Result<Vec<JournalImage>, DomainError>;

    /// Set the learner's caption on an image.
    ///
    /// # Errors
    ///
    /// - `ImageNotFound` if the image doesn't exist
    async fn update_image_caption(&self, id: &ImageId, caption: &str) -> Result<(), DomainError>;
}
