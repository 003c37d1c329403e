//! Transcript messages.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ImageId, JournalId, MessageId, Timestamp};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }
}

/// Kind of transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Regular turn text; bounded by the turn cap.
    Conversation,
    /// Quick-correction or evaluation output.
    Feedback,
    /// Message captioning an attached image.
    Image,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Conversation => "conversation",
            MessageType::Feedback => "feedback",
            MessageType::Image => "image",
        }
    }

    /// Parses the stored form, returning None for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "conversation" => Some(MessageType::Conversation),
            "feedback" => Some(MessageType::Feedback),
            "image" => Some(MessageType::Image),
            _ => None,
        }
    }
}

/// One immutable entry in a journal's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub journal_id: JournalId,
    pub sender: Sender,
    pub message_type: MessageType,
    pub text: String,
    pub image_id: Option<ImageId>,
    /// Caller-supplied key used to deduplicate retried user turns.
    pub idempotency_key: Option<String>,
    pub created_at: Timestamp,
}

impl ChatMessage {
    /// Creates a message stamped with the current time.
    pub fn new(
        journal_id: JournalId,
        sender: Sender,
        message_type: MessageType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            journal_id,
            sender,
            message_type,
            text: text.into(),
            image_id: None,
            idempotency_key: None,
            created_at: Timestamp::now(),
        }
    }

    /// Plain user turn.
    pub fn user(journal_id: JournalId, text: impl Into<String>) -> Self {
        Self::new(journal_id, Sender::User, MessageType::Conversation, text)
    }

    /// Plain AI reply.
    pub fn ai(journal_id: JournalId, text: impl Into<String>) -> Self {
        Self::new(journal_id, Sender::Ai, MessageType::Conversation, text)
    }

    /// AI-authored feedback entry.
    pub fn feedback(journal_id: JournalId, text: impl Into<String>) -> Self {
        Self::new(journal_id, Sender::Ai, MessageType::Feedback, text)
    }

    /// Tags the message as captioning the given image.
    pub fn with_image(mut self, image_id: ImageId) -> Self {
        self.message_type = MessageType::Image;
        self.image_id = Some(image_id);
        self
    }

    pub fn with_idempotency_key(mut self, key: Option<String>) -> Self {
        self.idempotency_key = key;
        self
    }

    /// Only conversation messages count against the turn cap.
    pub fn counts_toward_turn_cap(&self) -> bool {
        self.message_type == MessageType::Conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conversation_counts_toward_cap() {
        let j = JournalId::new();
        assert!(ChatMessage::user(j, "hi").counts_toward_turn_cap());
        assert!(ChatMessage::ai(j, "hello").counts_toward_turn_cap());
        assert!(!ChatMessage::feedback(j, "{}").counts_toward_turn_cap());
        assert!(!ChatMessage::user(j, "look")
            .with_image(ImageId::new())
            .counts_toward_turn_cap());
    }

    #[test]
    fn with_image_switches_type_and_links_image() {
        let image = ImageId::new();
        let m = ChatMessage::user(JournalId::new(), "my cat").with_image(image);
        assert_eq!(m.message_type, MessageType::Image);
        assert_eq!(m.image_id, Some(image));
        assert_eq!(m.sender, Sender::User);
    }

    #[test]
    fn message_type_round_trips_through_stored_form() {
        for t in [MessageType::Conversation, MessageType::Feedback, MessageType::Image] {
            assert_eq!(MessageType::parse(t.as_str()), Some(t));
        }
        assert_eq!(MessageType::parse("system"), None);
    }
}
