//! Evaluation and error-ledger handlers.

// Command handlers
mod evaluate_journal;
mod record_feedback;

// Query handlers
mod get_progress;

pub use evaluate_journal::{
    EvaluateJournalCommand, EvaluateJournalHandler, EvaluateJournalResult, MIN_EVALUATION_CHARS,
};
pub use get_progress::{GetProgressSummaryHandler, GetProgressSummaryQuery};
pub use record_feedback::{LedgerEntry, RecordFeedbackCommand, RecordFeedbackHandler};
