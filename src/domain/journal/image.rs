//! Images attached to a journal.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ImageId, JournalId, Timestamp};

/// An uploaded image owned by exactly one journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalImage {
    pub id: ImageId,
    pub journal_id: JournalId,
    /// Durable reference returned by the image storage.
    pub storage_ref: String,
    pub ai_description: Option<String>,
    pub user_caption: Option<String>,
    pub created_at: Timestamp,
}

impl JournalImage {
    pub fn new(journal_id: JournalId, storage_ref: impl Into<String>) -> Self {
        Self {
            id: ImageId::new(),
            journal_id,
            storage_ref: storage_ref.into(),
            ai_description: None,
            user_caption: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.ai_description = Some(description.into());
        self
    }

    /// Returns true if the image belongs to `journal_id`.
    pub fn belongs_to(&self, journal_id: &JournalId) -> bool {
        &self.journal_id == journal_id
    }

    /// Text the coach should see for this image: caption first, then description.
    pub fn context_text(&self) -> Option<String> {
        match (&self.user_caption, &self.ai_description) {
            (Some(c), Some(d)) => Some(format!("Caption: {}\nDescription: {}", c, d)),
            (Some(c), None) => Some(format!("Caption: {}", c)),
            (None, Some(d)) => Some(format!("Description: {}", d)),
            (None, None) => None,
        }
    }
}
