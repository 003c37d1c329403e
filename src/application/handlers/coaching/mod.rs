//! Coaching turn handlers.

mod journal_locks;
mod send_turn;

pub use journal_locks::JournalLocks;
pub use send_turn::{
    SendTurnCommand, SendTurnError, SendTurnHandler, SendTurnResult,
    SCAFFOLDING_FALLBACK_QUESTION, WRITING_FALLBACK_REPLY,
};
