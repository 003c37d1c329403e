//! Per-journal turn serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::JournalId;

/// One async mutex per journal, created on demand.
///
/// Entries nobody holds are pruned whenever a new lock is handed out, so
/// the map stays proportional to the number of journals with turns in flight.
#[derive(Debug, Default)]
pub struct JournalLocks {
    locks: Mutex<HashMap<JournalId, Arc<AsyncMutex<()>>>>,
}

impl JournalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `journal_id`.
    pub async fn acquire(&self, journal_id: &JournalId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.retain(|id, lock| id == journal_id || Arc::strong_count(lock) > 1);
            locks
                .entry(*journal_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of tracked journals.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
