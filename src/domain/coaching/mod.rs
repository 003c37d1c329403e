//! Coaching module - how the AI coach's replies turn into journal effects.

mod action;
mod correction;
mod dispatcher;
mod extractor;
pub mod prompts;

pub use action::{CoachAction, QuestionKind};
pub use correction::QuickCorrection;
pub use dispatcher::{ActionDispatcher, DispatchOutcome, DEFAULT_REPLY};
pub use extractor::{extract_json, ResponseSanitizer, SanitizationError, MAX_RESPONSE_LENGTH};
