//! TransitionPhaseHandler - Command handler for moving a journal between phases.
//!
//! Completing a journal hands a profile refresh job to the scheduler. The
//! caller never waits for it and never sees its failures.

use std::sync::Arc;
use tracing::{info, warn};

use super::{hydrate, load_owned_journal};
use crate::domain::foundation::{DomainError, JournalId, UserId};
use crate::domain::journal::{JournalView, PhaseTransition, WritingPhase};
use crate::ports::{JournalRepository, ProfileJobScheduler, ProfileRefreshJob};

/// Command to move a journal to a later phase.
#[derive(Debug, Clone)]
pub struct TransitionPhaseCommand {
    pub user_id: UserId,
    pub journal_id: JournalId,
    pub target: WritingPhase,
}

/// Result of a phase transition.
#[derive(Debug, Clone)]
pub struct TransitionPhaseResult {
    pub view: JournalView,
    pub transition: PhaseTransition,
    /// True when a profile refresh job was accepted by the scheduler.
    pub profile_job_scheduled: bool,
}

pub struct TransitionPhaseHandler {
    journals: Arc<dyn JournalRepository>,
    scheduler: Arc<dyn ProfileJobScheduler>,
}

impl TransitionPhaseHandler {
    pub fn new(
        journals: Arc<dyn JournalRepository>,
        scheduler: Arc<dyn ProfileJobScheduler>,
    ) -> Self {
        Self {
            journals,
            scheduler,
        }
    }

    pub async fn handle(
        &self,
        cmd: TransitionPhaseCommand,
    ) -> Result<TransitionPhaseResult, DomainError> {
        // 1. Load and authorize
        let mut journal =
            load_owned_journal(self.journals.as_ref(), &cmd.journal_id, &cmd.user_id).await?;

        // 2. Apply the transition rules
        let transition = journal.transition_to(cmd.target)?;
        if transition.is_noop() {
            let view = hydrate(self.journals.as_ref(), journal).await?;
            return Ok(TransitionPhaseResult {
                view,
                transition,
                profile_job_scheduled: false,
            });
        }

        // 3. Persist
        self.journals.update(&journal).await?;
        info!(
            journal_id = %journal.id(),
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            seeded = transition.content_seeded_from_outline,
            "Journal phase changed"
        );

        // 4. Detach the profile refresh on completion
        let mut profile_job_scheduled = false;
        if transition.completes_journal() {
            let job = ProfileRefreshJob {
                journal_id: *journal.id(),
            };
            match self.scheduler.schedule(job) {
                Ok(()) => profile_job_scheduled = true,
                Err(e) => {
                    warn!(journal_id = %journal.id(), error = %e, "Could not schedule profile refresh")
                }
            }
        }

        let view = hydrate(self.journals.as_ref(), journal).await?;
        Ok(TransitionPhaseResult {
            view,
            transition,
            profile_job_scheduled,
        })
    }
}
