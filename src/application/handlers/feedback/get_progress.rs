//! GetProgressSummaryHandler - Query handler for a learner's error totals.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::ledger::ProgressSummary;
use crate::ports::ErrorLedgerRepository;

#[derive(Debug, Clone)]
pub struct GetProgressSummaryQuery {
    pub user_id: UserId,
}

pub struct GetProgressSummaryHandler {
    ledger: Arc<dyn ErrorLedgerRepository>,
}

impl GetProgressSummaryHandler {
    pub fn new(ledger: Arc<dyn ErrorLedgerRepository>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: GetProgressSummaryQuery) -> Result<ProgressSummary, DomainError> {
        self.ledger.progress_summary(&query.user_id).await
    }
}
