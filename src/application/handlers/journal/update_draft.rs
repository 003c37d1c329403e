//! UpdateJournalDraftHandler - Command handler for saving the learner's draft.

use std::sync::Arc;
use tracing::debug;

use super::{hydrate, load_owned_journal};
use crate::domain::foundation::{DomainError, ErrorCode, JournalId, UserId};
use crate::domain::journal::{JournalView, WritingPhase};
use crate::ports::JournalRepository;

/// Command replacing the draft and, optionally, the outline.
#[derive(Debug, Clone)]
pub struct UpdateJournalDraftCommand {
    pub user_id: UserId,
    pub journal_id: JournalId,
    pub content: String,
    pub outline: Option<String>,
}

pub struct UpdateJournalDraftHandler {
    journals: Arc<dyn JournalRepository>,
}

impl UpdateJournalDraftHandler {
    pub fn new(journals: Arc<dyn JournalRepository>) -> Self {
        Self { journals }
    }

    pub async fn handle(&self, cmd: UpdateJournalDraftCommand) -> Result<JournalView, DomainError> {
        let mut journal =
            load_owned_journal(self.journals.as_ref(), &cmd.journal_id, &cmd.user_id).await?;

        if journal.writing_phase() == WritingPhase::Completed {
            return Err(DomainError::new(
                ErrorCode::PhaseClosed,
                "Completed journals can no longer be edited",
            ));
        }

        journal.replace_draft(cmd.content, cmd.outline);
        self.journals.update(&journal).await?;
        debug!(journal_id = %journal.id(), chars = journal.content().len(), "Draft saved");

        hydrate(self.journals.as_ref(), journal).await
    }
}
