//! CreateJournalHandler - Command handler for starting a day's journal.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, JournalId, UserId};
use crate::domain::journal::{Journal, JournalView};
use crate::ports::JournalRepository;

/// Command to create the journal for one calendar date.
#[derive(Debug, Clone)]
pub struct CreateJournalCommand {
    pub user_id: UserId,
    pub date: NaiveDate,
}

/// Handler for creating journals. One journal per user and date.
pub struct CreateJournalHandler {
    journals: Arc<dyn JournalRepository>,
}

impl CreateJournalHandler {
    pub fn new(journals: Arc<dyn JournalRepository>) -> Self {
        Self { journals }
    }

    pub async fn handle(&self, cmd: CreateJournalCommand) -> Result<JournalView, DomainError> {
        // 1. Reject a second journal for the same day
        if self
            .journals
            .find_by_user_and_date(&cmd.user_id, cmd.date)
            .await?
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::JournalAlreadyExists,
                format!("Journal already exists for {}", cmd.date),
            )
            .with_detail("date", cmd.date.to_string()));
        }

        // 2. Persist; the repository enforces uniqueness against races
        let journal = Journal::new(JournalId::new(), cmd.user_id, cmd.date);
        self.journals.create(&journal).await?;

        info!(journal_id = %journal.id(), user_id = %journal.user_id(), date = %cmd.date, "Journal created");
        Ok(JournalView::new(journal, Vec::new(), Vec::new()))
    }
}
