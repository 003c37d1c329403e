//! Journal aggregate entity.
//!
//! A journal is one learner's writing session for one calendar day. It owns
//! the outline built during scaffolding, the draft written afterwards, and
//! the writing phase that gates which coaching behavior applies.
//!
//! # Ownership
//!
//! Transcript messages and images reference the journal by ID and are
//! persisted separately; the aggregate does not hold them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WritingPhase;
use crate::domain::foundation::{
    DomainError, ErrorCode, JournalId, StateMachine, Timestamp, UserId,
};

/// Result of a phase change, describing what the transition did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    pub from: WritingPhase,
    pub to: WritingPhase,
    /// True when the draft was empty and was seeded from the outline.
    pub content_seeded_from_outline: bool,
}

impl PhaseTransition {
    /// Returns true if this transition moved the journal into `Completed`.
    pub fn completes_journal(&self) -> bool {
        self.to == WritingPhase::Completed && self.from != WritingPhase::Completed
    }

    /// Returns true if the phase did not change.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Journal aggregate - one writing session per user and day.
///
/// # Invariants
///
/// - `(user_id, date)` is unique (enforced by the repository)
/// - `writing_phase` only moves forward
/// - `outline_content` only grows through [`Journal::append_to_outline`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    id: JournalId,
    user_id: UserId,
    date: NaiveDate,
    outline_content: String,
    content: String,
    writing_phase: WritingPhase,
    completion_metrics: Option<serde_json::Value>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Journal {
    /// Create a new journal in the scaffolding phase with empty outline and draft.
    pub fn new(id: JournalId, user_id: UserId, date: NaiveDate) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            date,
            outline_content: String::new(),
            content: String::new(),
            writing_phase: WritingPhase::Scaffolding,
            completion_metrics: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a journal from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: JournalId,
        user_id: UserId,
        date: NaiveDate,
        outline_content: String,
        content: String,
        writing_phase: WritingPhase,
        completion_metrics: Option<serde_json::Value>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            outline_content,
            content,
            writing_phase,
            completion_metrics,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &JournalId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn outline_content(&self) -> &str {
        &self.outline_content
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn writing_phase(&self) -> WritingPhase {
        self.writing_phase
    }

    pub fn completion_metrics(&self) -> Option<&serde_json::Value> {
        self.completion_metrics.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user owns this journal.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Validates that the user can access this journal.
    ///
    /// A foreign journal is reported as missing so callers cannot probe for
    /// other users' entries.
    pub fn authorize(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::JournalNotFound,
                format!("Journal not found: {}", self.id),
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends text to the outline by plain concatenation.
    pub fn append_to_outline(&mut self, text: &str) {
        self.outline_content.push_str(text);
        self.updated_at = Timestamp::now();
    }

    /// Replaces the draft, and the outline when one is supplied.
    pub fn replace_draft(&mut self, content: String, outline: Option<String>) {
        self.content = content;
        if let Some(outline) = outline {
            self.outline_content = outline;
        }
        self.updated_at = Timestamp::now();
    }

    /// Records metrics computed when the journal was finished.
    pub fn set_completion_metrics(&mut self, metrics: serde_json::Value) {
        self.completion_metrics = Some(metrics);
        self.updated_at = Timestamp::now();
    }

    /// Moves the journal to `target`.
    ///
    /// Requesting the current phase is a no-op. Moving from scaffolding into
    /// writing with an empty draft copies the outline into the draft.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if `target` is earlier than the current phase
    pub fn transition_to(&mut self, target: WritingPhase) -> Result<PhaseTransition, DomainError> {
        let from = self.writing_phase;
        if from == target {
            return Ok(PhaseTransition {
                from,
                to: target,
                content_seeded_from_outline: false,
            });
        }

        let to = from.transition_to(target).map_err(|e| {
            DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
                .with_detail("from", from.as_str())
                .with_detail("to", target.as_str())
        })?;

        let seeded = from == WritingPhase::Scaffolding
            && to == WritingPhase::Writing
            && self.content.is_empty()
            && !self.outline_content.is_empty();
        if seeded {
            self.content = self.outline_content.clone();
        }

        self.writing_phase = to;
        self.updated_at = Timestamp::now();

        Ok(PhaseTransition {
            from,
            to,
            content_seeded_from_outline: seeded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn journal() -> Journal {
        Journal::new(
            JournalId::new(),
            UserId::new("learner-1").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    #[test]
    fn new_journal_starts_empty_in_scaffolding() {
        let j = journal();
        assert_eq!(j.writing_phase(), WritingPhase::Scaffolding);
        assert_eq!(j.outline_content(), "");
        assert_eq!(j.content(), "");
        assert!(j.completion_metrics().is_none());
    }

    #[test]
    fn append_to_outline_concatenates() {
        let mut j = journal();
        j.append_to_outline("A");
        j.append_to_outline("\nB");
        assert_eq!(j.outline_content(), "A\nB");
    }

    #[test]
    fn scaffolding_to_writing_seeds_empty_draft_from_outline() {
        let mut j = journal();
        j.append_to_outline("X");

        let t = j.transition_to(WritingPhase::Writing).unwrap();

        assert!(t.content_seeded_from_outline);
        assert_eq!(j.content(), "X");
    }

    #[test]
    fn scaffolding_to_writing_keeps_existing_draft() {
        let mut j = journal();
        j.append_to_outline("X");
        j.replace_draft("my draft".to_string(), None);

        let t = j.transition_to(WritingPhase::Writing).unwrap();

        assert!(!t.content_seeded_from_outline);
        assert_eq!(j.content(), "my draft");
    }

    #[test]
    fn skipping_writing_does_not_seed_draft() {
        let mut j = journal();
        j.append_to_outline("X");
        j.transition_to(WritingPhase::Evaluation).unwrap();
        assert_eq!(j.content(), "");
    }

    #[test]
    fn same_phase_request_is_noop() {
        let mut j = journal();
        let before = *j.updated_at();
        let t = j.transition_to(WritingPhase::Scaffolding).unwrap();
        assert!(t.is_noop());
        assert!(!t.completes_journal());
        assert_eq!(j.updated_at(), &before);
    }

    #[test]
    fn backward_transition_is_rejected_without_mutation() {
        let mut j = journal();
        j.transition_to(WritingPhase::Completed).unwrap();

        let err = j.transition_to(WritingPhase::Scaffolding).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(j.writing_phase(), WritingPhase::Completed);
    }

    #[test]
    fn entering_completed_is_reported() {
        let mut j = journal();
        j.transition_to(WritingPhase::Evaluation).unwrap();
        let t = j.transition_to(WritingPhase::Completed).unwrap();
        assert!(t.completes_journal());
    }

    #[test]
    fn foreign_user_sees_not_found() {
        let j = journal();
        let other = UserId::new("someone-else").unwrap();
        let err = j.authorize(&other).unwrap_err();
        assert_eq!(err.code, ErrorCode::JournalNotFound);
        assert!(j.authorize(j.user_id()).is_ok());
    }

    proptest! {
        #[test]
        fn outline_append_preserves_prefix(a in ".{0,40}", b in ".{0,40}") {
            let mut j = journal();
            j.append_to_outline(&a);
            j.append_to_outline(&b);
            prop_assert_eq!(j.outline_content(), format!("{}{}", a, b));
        }
    }
}
