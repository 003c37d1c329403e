//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers mutate journals and the ledger; query handlers only read.

pub mod handlers;

pub use handlers::{
    // Journal handlers
    AttachImageCommand, AttachImageHandler, AttachImageResult,
    CreateJournalCommand, CreateJournalHandler,
    GetJournalByDateQuery, GetJournalHandler, GetJournalQuery,
    TransitionPhaseCommand, TransitionPhaseHandler, TransitionPhaseResult,
    UpdateJournalDraftCommand, UpdateJournalDraftHandler,
    // Coaching handlers
    SendTurnCommand, SendTurnError, SendTurnHandler, SendTurnResult,
    // Feedback handlers
    EvaluateJournalCommand, EvaluateJournalHandler, EvaluateJournalResult,
    GetProgressSummaryHandler, GetProgressSummaryQuery,
    LedgerEntry, RecordFeedbackCommand, RecordFeedbackHandler,
    // Profile handlers
    RefreshContextProfileHandler,
};
