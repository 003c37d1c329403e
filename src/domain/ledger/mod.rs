//! Ledger module - normalized record of a learner's recurring mistakes.
//!
//! `UserError` answers "which errors exist" (deduplicated, with a
//! repetition count); `UserLearningHistory` answers "when did they recur"
//! (append-only, one row per occurrence).

mod entities;
mod feedback;
mod progress;

pub use entities::{
    LearningPoint, LearningTopic, UserError, UserErrorStatus, UserLearningHistory,
};
pub use feedback::{EvaluationFeedback, FeedbackItem};
pub use progress::{ProgressSummary, TopicErrorCount};
