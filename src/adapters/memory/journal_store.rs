//! In-memory journal repository.
//!
//! Suitable for development, tests and the single-process REPL. Data does
//! not survive restarts; use the PostgreSQL adapter for persistence.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ImageId, JournalId, UserId};
use crate::domain::journal::{ChatMessage, Journal, JournalImage, Sender};
use crate::ports::JournalRepository;

#[derive(Default)]
struct State {
    journals: HashMap<JournalId, Journal>,
    messages: HashMap<JournalId, Vec<ChatMessage>>,
    images: HashMap<ImageId, JournalImage>,
}

/// In-memory implementation of the JournalRepository port.
#[derive(Default)]
pub struct InMemoryJournalRepository {
    state: RwLock<State>,
}

impl InMemoryJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn journal_not_found(id: &JournalId) -> DomainError {
    DomainError::new(ErrorCode::JournalNotFound, format!("Journal not found: {}", id))
}

#[async_trait]
impl JournalRepository for InMemoryJournalRepository {
    async fn create(&self, journal: &Journal) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let duplicate = state
            .journals
            .values()
            .any(|j| j.user_id() == journal.user_id() && j.date() == journal.date());
        if duplicate || state.journals.contains_key(journal.id()) {
            return Err(DomainError::new(
                ErrorCode::JournalAlreadyExists,
                format!("Journal already exists for {}", journal.date()),
            ));
        }
        state.journals.insert(*journal.id(), journal.clone());
        state.messages.insert(*journal.id(), Vec::new());
        Ok(())
    }

    async fn find_by_id(&self, id: &JournalId) -> Result<Option<Journal>, DomainError> {
        Ok(self.state.read().await.journals.get(id).cloned())
    }

    async fn find_by_user_and_date(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .journals
            .values()
            .find(|j| j.user_id() == user_id && j.date() == date)
            .cloned())
    }

    async fn update(&self, journal: &Journal) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.journals.get_mut(journal.id()) {
            Some(existing) => {
                *existing = journal.clone();
                Ok(())
            }
            None => Err(journal_not_found(journal.id())),
        }
    }

    async fn delete(&self, id: &JournalId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.journals.remove(id).is_none() {
            return Err(journal_not_found(id));
        }
        state.messages.remove(id);
        state.images.retain(|_, image| &image.journal_id != id);
        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.journals.contains_key(&message.journal_id) {
            return Err(journal_not_found(&message.journal_id));
        }
        state
            .messages
            .entry(message.journal_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn messages(&self, journal_id: &JournalId) -> Result<Vec<ChatMessage>, DomainError> {
        let mut messages = self
            .state
            .read()
            .await
            .messages
            .get(journal_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn count_conversation_messages(
        &self,
        journal_id: &JournalId,
    ) -> Result<u32, DomainError> {
        let count = self
            .state
            .read()
            .await
            .messages
            .get(journal_id)
            .map(|msgs| msgs.iter().filter(|m| m.counts_toward_turn_cap()).count())
            .unwrap_or(0);
        Ok(count as u32)
    }

    async fn find_message_by_idempotency_key(
        &self,
        journal_id: &JournalId,
        key: &str,
    ) -> Result<Option<ChatMessage>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(journal_id)
            .and_then(|msgs| {
                msgs.iter()
                    .find(|m| m.sender == Sender::User && m.idempotency_key.as_deref() == Some(key))
                    .cloned()
            }))
    }

    async fn add_image(&self, image: &JournalImage) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.journals.contains_key(&image.journal_id) {
            return Err(journal_not_found(&image.journal_id));
        }
        state.images.insert(image.id, image.clone());
        Ok(())
    }

    async fn find_image(&self, id: &ImageId) -> Result<Option<JournalImage>, DomainError> {
        Ok(self.state.read().await.images.get(id).cloned())
    }

    async fn images(&self, journal_id: &JournalId) -> Result<Vec<JournalImage>, DomainError> {
        let mut images: Vec<JournalImage> = self
            .state
            .read()
            .await
            .images
            .values()
            .filter(|i| &i.journal_id == journal_id)
            .cloned()
            .collect();
        images.sort_by_key(|i| i.created_at);
        Ok(images)
    }

    async fn update_image_caption(&self, id: &ImageId, caption: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.images.get_mut(id) {
            Some(image) => {
                image.user_caption = Some(caption.to_string());
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::ImageNotFound,
                format!("Image not found: {}", id),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::journal::MessageType;

    fn journal(user: &str, day: u32) -> Journal {
        Journal::new(
            JournalId::new(),
            UserId::new(user).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, day).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_rejects_second_journal_for_same_day() {
        let repo = InMemoryJournalRepository::new();
        repo.create(&journal("u1", 1)).await.unwrap();

        let err = repo.create(&journal("u1", 1)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::JournalAlreadyExists);
        assert!(repo.create(&journal("u2", 1)).await.is_ok());
        assert!(repo.create(&journal("u1", 2)).await.is_ok());
    }

    #[tokio::test]
    async fn finds_by_user_and_date() {
        let repo = InMemoryJournalRepository::new();
        let j = journal("u1", 3);
        repo.create(&j).await.unwrap();

        let found = repo
            .find_by_user_and_date(j.user_id(), j.date())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), j.id());
    }

    #[tokio::test]
    async fn counts_only_conversation_messages() {
        let repo = InMemoryJournalRepository::new();
        let j = journal("u1", 4);
        repo.create(&j).await.unwrap();
        let id = *j.id();

        repo.append_message(&ChatMessage::user(id, "hi")).await.unwrap();
        repo.append_message(&ChatMessage::feedback(id, "{}")).await.unwrap();
        repo.append_message(&ChatMessage::ai(id, "hello")).await.unwrap();

        assert_eq!(repo.count_conversation_messages(&id).await.unwrap(), 2);
        let msgs = repo.messages(&id).await.unwrap();
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[1].message_type, MessageType::Feedback);
    }

    #[tokio::test]
    async fn append_to_missing_journal_fails() {
        let repo = InMemoryJournalRepository::new();
        let err = repo
            .append_message(&ChatMessage::user(JournalId::new(), "x"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::JournalNotFound);
    }

    #[tokio::test]
    async fn idempotency_lookup_matches_user_messages_only() {
        let repo = InMemoryJournalRepository::new();
        let j = journal("u1", 5);
        repo.create(&j).await.unwrap();
        let id = *j.id();
        let msg = ChatMessage::user(id, "hi").with_idempotency_key(Some("k1".to_string()));
        repo.append_message(&msg).await.unwrap();

        let found = repo.find_message_by_idempotency_key(&id, "k1").await.unwrap();
        assert_eq!(found.map(|m| m.id), Some(msg.id));
        assert!(repo
            .find_message_by_idempotency_key(&id, "k2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_cascades_to_messages_and_images() {
        let repo = InMemoryJournalRepository::new();
        let j = journal("u1", 6);
        repo.create(&j).await.unwrap();
        let id = *j.id();
        repo.append_message(&ChatMessage::user(id, "hi")).await.unwrap();
        let image = JournalImage::new(id, "ref");
        repo.add_image(&image).await.unwrap();

        repo.delete(&id).await.unwrap();

        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(repo.messages(&id).await.unwrap().is_empty());
        assert!(repo.find_image(&image.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn caption_update_requires_existing_image() {
        let repo = InMemoryJournalRepository::new();
        let j = journal("u1", 7);
        repo.create(&j).await.unwrap();
        let image = JournalImage::new(*j.id(), "ref");
        repo.add_image(&image).await.unwrap();

        repo.update_image_caption(&image.id, "Sunset").await.unwrap();

        let stored = repo.find_image(&image.id).await.unwrap().unwrap();
        assert_eq!(stored.user_caption.as_deref(), Some("Sunset"));
        let err = repo
            .update_image_caption(&ImageId::new(), "x")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageNotFound);
    }
}
