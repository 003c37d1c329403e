//! GetJournalHandler - Query handler for hydrated journals.

use chrono::NaiveDate;
use std::sync::Arc;

use super::{hydrate, load_owned_journal};
use crate::domain::foundation::{DomainError, JournalId, UserId};
use crate::domain::journal::JournalView;
use crate::ports::JournalRepository;

/// Query for one journal by id.
#[derive(Debug, Clone)]
pub struct GetJournalQuery {
    pub user_id: UserId,
    pub journal_id: JournalId,
}

/// Query for a user's journal on a given date.
#[derive(Debug, Clone)]
pub struct GetJournalByDateQuery {
    pub user_id: UserId,
    pub date: NaiveDate,
}

pub struct GetJournalHandler {
    journals: Arc<dyn JournalRepository>,
}

impl GetJournalHandler {
    pub fn new(journals: Arc<dyn JournalRepository>) -> Self {
        Self { journals }
    }

    /// Returns the journal with transcript and images, NotFound when absent or not owned.
    pub async fn handle(&self, query: GetJournalQuery) -> Result<JournalView, DomainError> {
        let journal =
            load_owned_journal(self.journals.as_ref(), &query.journal_id, &query.user_id).await?;
        hydrate(self.journals.as_ref(), journal).await
    }

    /// Returns the journal for a date, or None if the user has not started one.
    pub async fn handle_by_date(
        &self,
        query: GetJournalByDateQuery,
    ) -> Result<Option<JournalView>, DomainError> {
        match self
            .journals
            .find_by_user_and_date(&query.user_id, query.date)
            .await?
        {
            Some(journal) => Ok(Some(hydrate(self.journals.as_ref(), journal).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryJournalRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::journal::{ChatMessage, Journal};

    async fn setup() -> (Arc<InMemoryJournalRepository>, Journal) {
        let repo = Arc::new(InMemoryJournalRepository::new());
        let journal = Journal::new(
            JournalId::new(),
            UserId::new("owner").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        );
        repo.create(&journal).await.unwrap();
        repo.append_message(&ChatMessage::user(*journal.id(), "hello"))
            .await
            .unwrap();
        (repo, journal)
    }

    #[tokio::test]
    async fn returns_hydrated_view_for_owner() {
        let (repo, journal) = setup().await;
        let handler = GetJournalHandler::new(repo);

        let view = handler
            .handle(GetJournalQuery {
                user_id: UserId::new("owner").unwrap(),
                journal_id: *journal.id(),
            })
            .await
            .unwrap();

        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].text, "hello");
    }

    #[tokio::test]
    async fn foreign_journal_reads_as_not_found() {
        let (repo, journal) = setup().await;
        let handler = GetJournalHandler::new(repo);

        let err = handler
            .handle(GetJournalQuery {
                user_id: UserId::new("intruder").unwrap(),
                journal_id: *journal.id(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::JournalNotFound);
    }

    #[tokio::test]
    async fn by_date_returns_none_when_not_started() {
        let (repo, journal) = setup().await;
        let handler = GetJournalHandler::new(repo);

        let found = handler
            .handle_by_date(GetJournalByDateQuery {
                user_id: UserId::new("owner").unwrap(),
                date: journal.date(),
            })
            .await
            .unwrap();
        let missing = handler
            .handle_by_date(GetJournalByDateQuery {
                user_id: UserId::new("owner").unwrap(),
                date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
            })
            .await
            .unwrap();

        assert!(found.is_some());
        assert!(missing.is_none());
    }
}
