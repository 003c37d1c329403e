//! AttachImageHandler - Command handler for uploading a journal image.
//!
//! The bytes go to image storage, the AI writes a short description, and a
//! user `image` message referencing the upload joins the transcript.

use std::sync::Arc;
use tracing::{info, warn};

use super::{hydrate, load_owned_journal};
use crate::domain::coaching::prompts::{IMAGE_DESCRIPTION_FALLBACK, IMAGE_DESCRIPTION_PROMPT};
use crate::domain::foundation::{DomainError, ErrorCode, JournalId, UserId};
use crate::domain::journal::{ChatMessage, JournalImage, JournalView, MessageType, Sender};
use crate::ports::{AIProvider, ImageStorage, JournalRepository, ModelTier, PolicyRequest};

/// Transcript text for an upload without a caption.
pub const IMAGE_MESSAGE_PLACEHOLDER: &str = "[image]";

/// Command to attach an image to a journal.
#[derive(Debug, Clone)]
pub struct AttachImageCommand {
    pub user_id: UserId,
    pub journal_id: JournalId,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AttachImageResult {
    pub view: JournalView,
    pub image: JournalImage,
}

pub struct AttachImageHandler {
    journals: Arc<dyn JournalRepository>,
    storage: Arc<dyn ImageStorage>,
    ai: Arc<dyn AIProvider>,
}

impl AttachImageHandler {
    pub fn new(
        journals: Arc<dyn JournalRepository>,
        storage: Arc<dyn ImageStorage>,
        ai: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            journals,
            storage,
            ai,
        }
    }

    pub async fn handle(&self, cmd: AttachImageCommand) -> Result<AttachImageResult, DomainError> {
        // 1. Load, authorize, and require an open phase
        let journal =
            load_owned_journal(self.journals.as_ref(), &cmd.journal_id, &cmd.user_id).await?;
        if !journal.writing_phase().accepts_turns() {
            return Err(DomainError::new(
                ErrorCode::PhaseClosed,
                format!(
                    "Images cannot be added in the {} phase",
                    journal.writing_phase()
                ),
            ));
        }

        // 2. Store the bytes
        let storage_ref = self
            .storage
            .store(journal.id(), &cmd.filename, &cmd.bytes)
            .await?;

        // 3. Describe the image; a failed description is not fatal
        let description = self.describe(journal.id(), cmd.bytes).await;

        // 4. Persist the image and its transcript entry
        let caption = cmd
            .caption
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let mut image = JournalImage::new(*journal.id(), storage_ref).with_description(description);
        image.user_caption = caption.clone();
        self.journals.add_image(&image).await?;

        let text = caption.unwrap_or_else(|| IMAGE_MESSAGE_PLACEHOLDER.to_string());
        let message = ChatMessage::new(*journal.id(), Sender::User, MessageType::Image, text)
            .with_image(image.id);
        self.journals.append_message(&message).await?;

        info!(journal_id = %journal.id(), image_id = %image.id, "Image attached");
        let view = hydrate(self.journals.as_ref(), journal).await?;
        Ok(AttachImageResult { view, image })
    }

    async fn describe(&self, journal_id: &JournalId, bytes: Vec<u8>) -> String {
        let request =
            PolicyRequest::text(IMAGE_DESCRIPTION_PROMPT, ModelTier::Flash).with_image(bytes);
        match self.ai.invoke(request).await {
            Ok(output) => {
                let text = output.into_text();
                let text = text.trim();
                if text.is_empty() {
                    IMAGE_DESCRIPTION_FALLBACK.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(e) => {
                warn!(journal_id = %journal_id, error = %e, "Image description failed");
                IMAGE_DESCRIPTION_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::memory::InMemoryJournalRepository;
    use crate::adapters::storage::InMemoryImageStorage;
    use crate::domain::journal::{Journal, WritingPhase};
    use crate::ports::AIError;
    use chrono::NaiveDate;

    struct Fixture {
        journals: Arc<InMemoryJournalRepository>,
        storage: Arc<InMemoryImageStorage>,
        ai: MockAIProvider,
        journal_id: JournalId,
    }

    impl Fixture {
        async fn new(ai: MockAIProvider, phase: WritingPhase) -> Self {
            let journals = Arc::new(InMemoryJournalRepository::new());
            let mut journal = Journal::new(
                JournalId::new(),
                UserId::new("u").unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            );
            journal.transition_to(phase).unwrap();
            journals.create(&journal).await.unwrap();
            Self {
                journals,
                storage: Arc::new(InMemoryImageStorage::new()),
                ai,
                journal_id: *journal.id(),
            }
        }

        fn handler(&self) -> AttachImageHandler {
            AttachImageHandler::new(
                self.journals.clone(),
                self.storage.clone(),
                Arc::new(self.ai.clone()),
            )
        }

        fn command(&self, caption: Option<&str>) -> AttachImageCommand {
            AttachImageCommand {
                user_id: UserId::new("u").unwrap(),
                journal_id: self.journal_id,
                filename: "beach.jpg".to_string(),
                bytes: vec![0xFF, 0xD8, 0xFF],
                caption: caption.map(str::to_string),
            }
        }
    }

    #[tokio::test]
    async fn stores_describes_and_records_image_message() {
        let fx = Fixture::new(
            MockAIProvider::new().with_text("A sunny beach with two dogs."),
            WritingPhase::Scaffolding,
        )
        .await;

        let result = fx.handler().handle(fx.command(Some("Our trip"))).await.unwrap();

        assert_eq!(
            result.image.ai_description.as_deref(),
            Some("A sunny beach with two dogs.")
        );
        assert_eq!(result.image.user_caption.as_deref(), Some("Our trip"));
        assert_eq!(result.view.images.len(), 1);
        let message = result.view.messages.last().unwrap();
        assert_eq!(message.message_type, MessageType::Image);
        assert_eq!(message.image_id, Some(result.image.id));
        assert_eq!(message.text, "Our trip");
        assert_eq!(fx.storage.len().await, 1);

        let call = &fx.ai.calls()[0];
        assert_eq!(call.tier, ModelTier::Flash);
        assert!(call.image.is_some());
    }

    #[tokio::test]
    async fn description_failure_uses_fallback() {
        let fx = Fixture::new(
            MockAIProvider::new().with_error(AIError::unavailable("down")),
            WritingPhase::Scaffolding,
        )
        .await;

        let result = fx.handler().handle(fx.command(None)).await.unwrap();

        assert_eq!(
            result.image.ai_description.as_deref(),
            Some(IMAGE_DESCRIPTION_FALLBACK)
        );
        assert_eq!(result.view.messages[0].text, IMAGE_MESSAGE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn image_messages_do_not_count_toward_the_cap() {
        let fx = Fixture::new(MockAIProvider::new(), WritingPhase::Scaffolding).await;

        fx.handler().handle(fx.command(None)).await.unwrap();

        assert_eq!(
            fx.journals
                .count_conversation_messages(&fx.journal_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn closed_phase_rejects_upload_before_storing() {
        let fx = Fixture::new(MockAIProvider::new(), WritingPhase::Evaluation).await;

        let err = fx.handler().handle(fx.command(None)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::PhaseClosed);
        assert!(fx.storage.is_empty().await);
    }

    #[tokio::test]
    async fn empty_upload_is_a_validation_error() {
        let fx = Fixture::new(MockAIProvider::new(), WritingPhase::Scaffolding).await;
        let mut cmd = fx.command(None);
        cmd.bytes.clear();

        let err = fx.handler().handle(cmd).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
