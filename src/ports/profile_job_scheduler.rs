//! Profile job scheduling port.
//!
//! Completing a journal hands a job to the scheduler and returns
//! immediately; the job runs out of band.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{DomainError, JournalId};

/// Request to refresh the owner's context profile from one journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRefreshJob {
    pub journal_id: JournalId,
}

/// Errors from scheduling or running background jobs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("job queue is full")]
    QueueFull,

    #[error("job queue is closed")]
    QueueClosed,

    #[error("job failed after {attempts} attempts: {message}")]
    Failed { attempts: u32, message: String },
}

/// Port for enqueuing profile refresh jobs. Must not block.
pub trait ProfileJobScheduler: Send + Sync {
    fn schedule(&self, job: ProfileRefreshJob) -> Result<(), JobError>;
}

/// Executes one profile refresh job. Implemented by the application layer
/// and driven by the background worker.
#[async_trait]
pub trait ProfileJobRunner: Send + Sync {
    async fn run(&self, job: ProfileRefreshJob) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_is_object_safe() {
        fn _accepts_dyn(_s: &dyn ProfileJobScheduler) {}
        fn _accepts_runner(_r: &dyn ProfileJobRunner) {}
    }

    #[test]
    fn job_serializes_with_journal_id() {
        let job = ProfileRefreshJob {
            journal_id: JournalId::new(),
        };
        let value = serde_json::to_value(job).unwrap();
        assert_eq!(value["journal_id"], job.journal_id.to_string());
    }
}
