//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the coaching domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCategory, ErrorCode, ValidationError};
pub use ids::{
    HistoryId, ImageId, JournalId, LearningPointId, MessageId, TopicId, UserErrorId, UserId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
