//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod coaching;
pub mod feedback;
pub mod journal;
pub mod profile;

pub use coaching::{SendTurnCommand, SendTurnError, SendTurnHandler, SendTurnResult};
pub use feedback::{
    EvaluateJournalCommand, EvaluateJournalHandler, EvaluateJournalResult,
    GetProgressSummaryHandler, GetProgressSummaryQuery, LedgerEntry, RecordFeedbackCommand,
    RecordFeedbackHandler,
};
pub use journal::{
    AttachImageCommand, AttachImageHandler, AttachImageResult, CreateJournalCommand,
    CreateJournalHandler, GetJournalByDateQuery, GetJournalHandler, GetJournalQuery,
    TransitionPhaseCommand, TransitionPhaseHandler, TransitionPhaseResult,
    UpdateJournalDraftCommand, UpdateJournalDraftHandler,
};
pub use profile::RefreshContextProfileHandler;
