//! Hydrated journal read model.

use serde::Serialize;

use super::{ChatMessage, Journal, JournalImage, MessageType};

/// Full journal state returned by every mutating operation.
#[derive(Debug, Clone, Serialize)]
pub struct JournalView {
    pub journal: Journal,
    /// Transcript ordered by creation time, oldest first.
    pub messages: Vec<ChatMessage>,
    pub images: Vec<JournalImage>,
}

impl JournalView {
    pub fn new(journal: Journal, messages: Vec<ChatMessage>, images: Vec<JournalImage>) -> Self {
        Self {
            journal,
            messages,
            images,
        }
    }

    /// Number of messages counted against the turn cap.
    pub fn conversation_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.counts_toward_turn_cap())
            .count()
    }

    /// Messages of the given kind, in transcript order.
    pub fn messages_of_type(&self, message_type: MessageType) -> impl Iterator<Item = &ChatMessage> {
        self.messages
            .iter()
            .filter(move |m| m.message_type == message_type)
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
