//! RefreshContextProfileHandler - rebuilds a learner's context profile from a
//! finished journal.
//!
//! Runs out of band, driven by the profile worker. The profile is replaced
//! wholesale, and only once every extraction step has succeeded.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::coaching::prompts::{cognitive_prompt, linguistic_prompt, summary_prompt};
use crate::domain::foundation::{DomainError, ErrorCode, JournalId, Timestamp};
use crate::domain::journal::ChatMessage;
use crate::domain::profile::{CognitiveProfile, LinguisticProfile, ProfileData, UserContextProfile};
use crate::ports::{
    AIProvider, ContextProfileRepository, JournalRepository, ModelTier, PolicyOutput,
    PolicyRequest, ProfileJobRunner, ProfileRefreshJob,
};

pub struct RefreshContextProfileHandler {
    journals: Arc<dyn JournalRepository>,
    profiles: Arc<dyn ContextProfileRepository>,
    ai: Arc<dyn AIProvider>,
}

impl RefreshContextProfileHandler {
    pub fn new(
        journals: Arc<dyn JournalRepository>,
        profiles: Arc<dyn ContextProfileRepository>,
        ai: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            journals,
            profiles,
            ai,
        }
    }

    pub async fn handle(&self, journal_id: &JournalId) -> Result<UserContextProfile, DomainError> {
        // 1. Load the journal and its transcript
        let journal = self.journals.find_by_id(journal_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::JournalNotFound,
                format!("Journal not found: {}", journal_id),
            )
        })?;
        let transcript = self.journals.messages(journal_id).await?;
        let full_text = combined_text(journal.content(), &transcript);

        // 2. Thematic summary
        let summary = self
            .ai
            .invoke(PolicyRequest::text(summary_prompt(&full_text), ModelTier::Lite))
            .await?
            .into_text();
        debug!(journal_id = %journal_id, chars = summary.len(), "Journal summarized");

        // 3. Cognitive from the summary, linguistic from the learner's own text
        let (cognitive_profile, linguistic_profile) = futures::try_join!(
            self.extract::<CognitiveProfile>(cognitive_prompt(&summary)),
            self.extract::<LinguisticProfile>(linguistic_prompt(journal.content())),
        )?;

        // 4. Overwrite
        let data = ProfileData {
            linguistic_profile,
            cognitive_profile,
        };
        let mut profile = self
            .profiles
            .find_by_user(journal.user_id())
            .await?
            .unwrap_or_else(|| UserContextProfile::empty(journal.user_id().clone()));
        profile.overwrite(data.to_value(), Timestamp::now());
        self.profiles.save(&profile).await?;

        info!(journal_id = %journal_id, user_id = %journal.user_id(), "Context profile refreshed");
        Ok(profile)
    }

    async fn extract<T: DeserializeOwned>(&self, prompt: String) -> Result<T, DomainError> {
        let value = self
            .ai
            .invoke(PolicyRequest::json(prompt, ModelTier::Lite))
            .await
            .and_then(PolicyOutput::into_json)?;
        serde_json::from_value(value).map_err(|e| {
            DomainError::new(
                ErrorCode::AIServiceUnavailable,
                format!("Unexpected profile shape: {}", e),
            )
        })
    }
}

#[async_trait]
impl ProfileJobRunner for RefreshContextProfileHandler {
    async fn run(&self, job: ProfileRefreshJob) -> Result<(), DomainError> {
        self.handle(&job.journal_id).await.map(|_| ())
    }
}

/// Draft followed by the transcript, one `sender: text` line per message.
fn combined_text(content: &str, transcript: &[ChatMessage]) -> String {
    let history = transcript
        .iter()
        .map(|m| format!("{}: {}", m.sender.as_str(), m.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n\nChat History:\n{}", content, history)
}
