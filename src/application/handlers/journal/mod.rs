//! Journal command and query handlers.

// Command handlers
mod attach_image;
mod create_journal;
mod transition_phase;
mod update_draft;

// Query handlers
mod get_journal;

pub use attach_image::{AttachImageCommand, AttachImageHandler, AttachImageResult, IMAGE_MESSAGE_PLACEHOLDER};
pub use create_journal::{CreateJournalCommand, CreateJournalHandler};
pub use get_journal::{GetJournalByDateQuery, GetJournalHandler, GetJournalQuery};
pub use transition_phase::{TransitionPhaseCommand, TransitionPhaseHandler, TransitionPhaseResult};
pub use update_draft::{UpdateJournalDraftCommand, UpdateJournalDraftHandler};

use crate::domain::foundation::{DomainError, ErrorCode, JournalId, UserId};
use crate::domain::journal::{Journal, JournalView};
use crate::ports::JournalRepository;

/// Loads a journal and checks ownership. Foreign journals read as missing.
pub(crate) async fn load_owned_journal(
    journals: &dyn JournalRepository,
    journal_id: &JournalId,
    user_id: &UserId,
) -> Result<Journal, DomainError> {
    let journal = journals.find_by_id(journal_id).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::JournalNotFound,
            format!("Journal not found: {}", journal_id),
        )
    })?;
    journal.authorize(user_id)?;
    Ok(journal)
}

/// Builds the full view of a journal: transcript and images included.
pub(crate) async fn hydrate(
    journals: &dyn JournalRepository,
    journal: Journal,
) -> Result<JournalView, DomainError> {
    let messages = journals.messages(journal.id()).await?;
    let images = journals.images(journal.id()).await?;
    Ok(JournalView::new(journal, messages, images))
}
