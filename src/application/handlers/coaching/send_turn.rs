//! SendTurnHandler - the turn orchestrator.
//!
//! One call handles one learner message:
//!
//! 1. Validate the message and take the journal's turn lock
//! 2. Load the journal, check ownership and phase
//! 3. Replay or resume an idempotent retry, otherwise enforce the turn cap
//! 4. Persist the user message (tagged `image` when it captions an upload)
//! 5. Run the phase policy and the quick correction concurrently
//! 6. Apply the coach action, persist feedback and the AI reply
//! 7. Return the hydrated journal
//!
//! AI failures never fail the turn: the coach answers with a fixed apology
//! and the correction records `no_errors`.

use futures::join;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::journal_locks::JournalLocks;
use crate::application::handlers::journal::{hydrate, load_owned_journal};
use crate::config::SessionConfig;
use crate::domain::coaching::prompts::{
    quick_correction_prompt, scaffolding_prompt, writing_partner_prompt, ScaffoldingContext,
};
use crate::domain::coaching::{
    ActionDispatcher, CoachAction, QuickCorrection, ResponseSanitizer, DEFAULT_REPLY,
};
use crate::domain::foundation::{
    DomainError, ErrorCategory, ErrorCode, ImageId, JournalId, UserId,
};
use crate::domain::journal::{
    ChatMessage, Journal, JournalImage, JournalView, MessageType, Sender, WritingPhase,
};
use crate::ports::{
    AIProvider, ContextProfileRepository, ImageStorage, JournalRepository, ModelTier,
    PolicyOutput, PolicyRequest,
};

/// Question asked when the scaffolding policy cannot be reached.
pub const SCAFFOLDING_FALLBACK_QUESTION: &str =
    "I'm sorry, I'm having a little trouble thinking. Could you rephrase that?";

/// Reply stored when the writing policy cannot be reached.
pub const WRITING_FALLBACK_REPLY: &str = "I'm sorry, I'm unable to help with that right now.";

/// Command to send one learner message.
#[derive(Debug, Clone)]
pub struct SendTurnCommand {
    pub user_id: UserId,
    pub journal_id: JournalId,
    pub message: String,
    /// Previously uploaded image this message captions.
    pub image_id: Option<ImageId>,
    /// Overrides the configured quick-correction default.
    pub correction_enabled: Option<bool>,
    /// Client key that makes retries of the same turn safe.
    pub idempotency_key: Option<String>,
}

impl SendTurnCommand {
    pub fn new(user_id: UserId, journal_id: JournalId, message: impl Into<String>) -> Self {
        Self {
            user_id,
            journal_id,
            message: message.into(),
            image_id: None,
            correction_enabled: None,
            idempotency_key: None,
        }
    }

    pub fn with_image(mut self, image_id: ImageId) -> Self {
        self.image_id = Some(image_id);
        self
    }

    pub fn with_correction(mut self, enabled: bool) -> Self {
        self.correction_enabled = Some(enabled);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Result of a turn.
#[derive(Debug, Clone)]
pub struct SendTurnResult {
    pub view: JournalView,
    /// Correction recorded for this turn, if correction ran.
    pub correction: Option<QuickCorrection>,
    /// True when the phase policy failed and the apology was stored.
    pub used_fallback: bool,
    /// True when the key matched a turn that had already been answered.
    pub replayed: bool,
}

/// Errors that reject a turn before anything is written.
#[derive(Debug, Clone, Error)]
pub enum SendTurnError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Journal is in the {0} phase and no longer accepts turns")]
    PhaseClosed(WritingPhase),

    #[error("Turn cap of {cap} conversation messages reached")]
    TurnCapReached { cap: u32 },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SendTurnError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SendTurnError::EmptyMessage => ErrorCategory::Validation,
            SendTurnError::PhaseClosed(_) => ErrorCategory::Conflict,
            SendTurnError::TurnCapReached { .. } => ErrorCategory::Capacity,
            SendTurnError::Domain(e) => e.category(),
        }
    }
}

impl From<SendTurnError> for DomainError {
    fn from(err: SendTurnError) -> Self {
        match err {
            SendTurnError::EmptyMessage => DomainError::validation("message", err.to_string()),
            SendTurnError::PhaseClosed(phase) => {
                DomainError::new(ErrorCode::PhaseClosed, err.to_string())
                    .with_detail("phase", phase.as_str())
            }
            SendTurnError::TurnCapReached { cap } => {
                DomainError::new(ErrorCode::TurnCapReached, err.to_string())
                    .with_detail("cap", cap.to_string())
            }
            SendTurnError::Domain(e) => e,
        }
    }
}

/// What the phase policy asked for.
enum PolicyReply {
    Action(CoachAction),
    Text(String),
}

pub struct SendTurnHandler {
    journals: Arc<dyn JournalRepository>,
    profiles: Arc<dyn ContextProfileRepository>,
    storage: Arc<dyn ImageStorage>,
    ai: Arc<dyn AIProvider>,
    config: SessionConfig,
    locks: JournalLocks,
    dispatcher: ActionDispatcher,
    sanitizer: ResponseSanitizer,
}

impl SendTurnHandler {
    pub fn new(
        journals: Arc<dyn JournalRepository>,
        profiles: Arc<dyn ContextProfileRepository>,
        storage: Arc<dyn ImageStorage>,
        ai: Arc<dyn AIProvider>,
        config: SessionConfig,
    ) -> Self {
        Self {
            journals,
            profiles,
            storage,
            ai,
            config,
            locks: JournalLocks::new(),
            dispatcher: ActionDispatcher::new(),
            sanitizer: ResponseSanitizer::new(),
        }
    }

    pub async fn handle(&self, cmd: SendTurnCommand) -> Result<SendTurnResult, SendTurnError> {
        // 1. Validate and serialize
        let text = cmd.message.trim().to_string();
        if text.is_empty() {
            return Err(SendTurnError::EmptyMessage);
        }
        let _turn_guard = if self.config.serialize_turns {
            Some(self.locks.acquire(&cmd.journal_id).await)
        } else {
            None
        };

        // 2. Load, authorize, check phase
        let mut journal =
            load_owned_journal(self.journals.as_ref(), &cmd.journal_id, &cmd.user_id).await?;
        let phase = journal.writing_phase();
        if !phase.accepts_turns() {
            return Err(SendTurnError::PhaseClosed(phase));
        }

        // 3. Idempotent retries
        let mut resumed = None;
        if let Some(key) = cmd.idempotency_key.as_deref() {
            if let Some(existing) = self
                .journals
                .find_message_by_idempotency_key(journal.id(), key)
                .await?
            {
                let messages = self.journals.messages(journal.id()).await?;
                if answered(&messages, &existing) {
                    info!(journal_id = %journal.id(), key = key, "Replaying answered turn");
                    let images = self.journals.images(journal.id()).await?;
                    return Ok(SendTurnResult {
                        view: JournalView::new(journal, messages, images),
                        correction: None,
                        used_fallback: false,
                        replayed: true,
                    });
                }
                debug!(journal_id = %journal.id(), key = key, "Resuming unanswered turn");
                resumed = Some(existing);
            }
        }

        // 4. Turn cap, then persist the user message
        let (user_message, image) = match resumed {
            Some(existing) => {
                let image = self.resolve_image(&journal, existing.image_id).await?;
                (existing, image)
            }
            None => {
                let mut image = self.resolve_image(&journal, cmd.image_id).await?;
                // An image message does not count, only the reply does
                let added = if image.is_some() { 1 } else { 2 };
                self.check_turn_cap(journal.id(), added).await?;
                let mut message = ChatMessage::user(*journal.id(), text.clone())
                    .with_idempotency_key(cmd.idempotency_key.clone());
                if let Some(image) = image.as_mut() {
                    message.message_type = MessageType::Image;
                    message = message.with_image(image.id);
                    self.journals.update_image_caption(&image.id, &text).await?;
                    image.user_caption = Some(text.clone());
                }
                self.journals.append_message(&message).await?;
                (message, image)
            }
        };

        // 5. Phase policy and quick correction
        let correction_enabled = cmd
            .correction_enabled
            .unwrap_or(self.config.quick_correction_default);
        let transcript = self.journals.messages(journal.id()).await?;
        let profile_data = self
            .profiles
            .find_by_user(&cmd.user_id)
            .await?
            .map(|p| p.profile_data)
            .unwrap_or_else(|| serde_json::json!({}));
        let image_bytes = self.load_image_bytes(phase, image.as_ref()).await;

        let policy = self.run_policy(
            &journal,
            &user_message.text,
            &transcript,
            &profile_data,
            image.as_ref(),
            image_bytes,
        );
        let correction = async {
            if correction_enabled {
                Some(self.check_message(journal.id(), &user_message.text).await)
            } else {
                None
            }
        };
        let ((reply, used_fallback), correction) = join!(policy, correction);

        // 6. Apply effects
        let reply_text = match reply {
            PolicyReply::Action(action) => {
                let outcome = self.dispatcher.apply(&action, &mut journal);
                debug!(journal_id = %journal.id(), action = action.tag(), "Coach action applied");
                if outcome.outline_changed {
                    self.journals.update(&journal).await?;
                }
                outcome.reply_text
            }
            PolicyReply::Text(text) => text,
        };

        if let Some(correction) = &correction {
            let feedback = ChatMessage::feedback(*journal.id(), correction.to_message_text());
            self.journals.append_message(&feedback).await?;
        }

        let reply_text = self.clean_reply(journal.id(), &reply_text);
        self.journals
            .append_message(&ChatMessage::ai(*journal.id(), reply_text))
            .await?;

        info!(
            journal_id = %journal.id(),
            phase = phase.as_str(),
            used_fallback = used_fallback,
            correction = correction.as_ref().map(|c| c.status()).unwrap_or("off"),
            "Turn completed"
        );

        // 7. Hydrate
        let view = hydrate(self.journals.as_ref(), journal).await?;
        Ok(SendTurnResult {
            view,
            correction,
            used_fallback,
            replayed: false,
        })
    }

    /// The counted messages a turn adds must fit entirely under the cap.
    async fn check_turn_cap(
        &self,
        journal_id: &JournalId,
        added: u32,
    ) -> Result<(), SendTurnError> {
        let cap = self.config.max_chat_turns;
        let count = self.journals.count_conversation_messages(journal_id).await?;
        if count.saturating_add(added) > cap {
            warn!(journal_id = %journal_id, count = count, cap = cap, "Turn cap reached");
            return Err(SendTurnError::TurnCapReached { cap });
        }
        Ok(())
    }

    async fn resolve_image(
        &self,
        journal: &Journal,
        image_id: Option<ImageId>,
    ) -> Result<Option<JournalImage>, DomainError> {
        let Some(image_id) = image_id else {
            return Ok(None);
        };
        match self.journals.find_image(&image_id).await? {
            Some(image) if image.belongs_to(journal.id()) => Ok(Some(image)),
            _ => {
                warn!(journal_id = %journal.id(), image_id = %image_id, "Ignoring image reference outside this journal");
                Ok(None)
            }
        }
    }

    /// Bytes are only sent to the scaffolding policy; a missing file just drops them.
    async fn load_image_bytes(
        &self,
        phase: WritingPhase,
        image: Option<&JournalImage>,
    ) -> Option<Vec<u8>> {
        let image = image.filter(|_| phase == WritingPhase::Scaffolding)?;
        match self.storage.load(&image.storage_ref).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(image_id = %image.id, error = %e, "Could not load image bytes");
                None
            }
        }
    }

    async fn run_policy(
        &self,
        journal: &Journal,
        message: &str,
        transcript: &[ChatMessage],
        profile_data: &serde_json::Value,
        image: Option<&JournalImage>,
        image_bytes: Option<Vec<u8>>,
    ) -> (PolicyReply, bool) {
        match journal.writing_phase() {
            WritingPhase::Scaffolding => {
                let ctx = ScaffoldingContext {
                    profile_data,
                    outline: journal.outline_content(),
                    transcript: transcript
                        .iter()
                        .filter(|m| m.message_type != MessageType::Feedback)
                        .map(|m| (m.sender.as_str(), m.text.as_str()))
                        .collect(),
                    image_description: image.and_then(|i| i.ai_description.as_deref()),
                    user_caption: image.and_then(|i| i.user_caption.as_deref()),
                };
                let tier = if image_bytes.is_some() {
                    ModelTier::Flash
                } else {
                    ModelTier::Lite
                };
                let mut request = PolicyRequest::json(scaffolding_prompt(&ctx), tier);
                if let Some(bytes) = image_bytes {
                    request = request.with_image(bytes);
                }
                match self.ai.invoke(request).await.and_then(PolicyOutput::into_json) {
                    Ok(value) => (PolicyReply::Action(CoachAction::from_json(&value)), false),
                    Err(e) => {
                        warn!(journal_id = %journal.id(), error = %e, "Scaffolding policy failed, asking again");
                        (
                            PolicyReply::Action(CoachAction::ask(SCAFFOLDING_FALLBACK_QUESTION)),
                            true,
                        )
                    }
                }
            }
            _ => {
                let prompt =
                    writing_partner_prompt(message, journal.outline_content(), journal.content());
                match self
                    .ai
                    .invoke(PolicyRequest::text(prompt, ModelTier::Lite))
                    .await
                {
                    Ok(output) => (PolicyReply::Text(output.into_text()), false),
                    Err(e) => {
                        warn!(journal_id = %journal.id(), error = %e, "Writing policy failed");
                        (PolicyReply::Text(WRITING_FALLBACK_REPLY.to_string()), true)
                    }
                }
            }
        }
    }

    async fn check_message(&self, journal_id: &JournalId, message: &str) -> QuickCorrection {
        let request = PolicyRequest::json(quick_correction_prompt(message), ModelTier::Lite);
        match self.ai.invoke(request).await.and_then(PolicyOutput::into_json) {
            Ok(value) => QuickCorrection::classify(&value),
            Err(e) => {
                warn!(journal_id = %journal_id, error = %e, "Quick correction failed");
                QuickCorrection::NoErrors
            }
        }
    }

    fn clean_reply(&self, journal_id: &JournalId, text: &str) -> String {
        match self.sanitizer.sanitize(text) {
            Ok(clean) if !clean.is_empty() => clean,
            Ok(_) => DEFAULT_REPLY.to_string(),
            Err(e) => {
                warn!(journal_id = %journal_id, error = %e, "Discarding AI reply");
                DEFAULT_REPLY.to_string()
            }
        }
    }
}

/// True if an AI conversation reply follows `message` in the transcript.
fn answered(transcript: &[ChatMessage], message: &ChatMessage) -> bool {
    transcript
        .iter()
        .skip_while(|m| m.id != message.id)
        .skip(1)
        .any(|m| m.sender == Sender::Ai && m.message_type == MessageType::Conversation)
}
