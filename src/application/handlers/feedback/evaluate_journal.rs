//! EvaluateJournalHandler - end-of-entry feedback flow.
//!
//! Unlike a conversational turn there is no safe default here: if the
//! evaluation policy fails the caller gets `AIServiceUnavailable`.

use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use super::record_feedback::{LedgerEntry, RecordFeedbackCommand, RecordFeedbackHandler};
use crate::application::handlers::journal::load_owned_journal;
use crate::domain::coaching::prompts::evaluation_prompt;
use crate::domain::foundation::{DomainError, ErrorCode, JournalId, Timestamp, UserId};
use crate::domain::journal::ChatMessage;
use crate::domain::ledger::EvaluationFeedback;
use crate::ports::{AIProvider, ErrorLedgerRepository, JournalRepository, ModelTier, PolicyOutput, PolicyRequest};

/// Shortest text worth evaluating, after trimming.
pub const MIN_EVALUATION_CHARS: usize = 10;

/// Command to evaluate a journal entry.
#[derive(Debug, Clone)]
pub struct EvaluateJournalCommand {
    pub user_id: UserId,
    pub journal_id: JournalId,
    /// Text to evaluate; the journal's draft when absent.
    pub text: Option<String>,
    /// Append the summary to the transcript as a feedback message.
    pub record_summary: bool,
}

#[derive(Debug, Clone)]
pub struct EvaluateJournalResult {
    pub feedback: EvaluationFeedback,
    pub entries: Vec<LedgerEntry>,
}

pub struct EvaluateJournalHandler {
    journals: Arc<dyn JournalRepository>,
    ai: Arc<dyn AIProvider>,
    recorder: RecordFeedbackHandler,
}

impl EvaluateJournalHandler {
    pub fn new(
        journals: Arc<dyn JournalRepository>,
        ledger: Arc<dyn ErrorLedgerRepository>,
        ai: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            journals,
            ai,
            recorder: RecordFeedbackHandler::new(ledger),
        }
    }

    pub async fn handle(
        &self,
        cmd: EvaluateJournalCommand,
    ) -> Result<EvaluateJournalResult, DomainError> {
        // 1. Load and pick the text
        let mut journal =
            load_owned_journal(self.journals.as_ref(), &cmd.journal_id, &cmd.user_id).await?;
        let text = cmd
            .text
            .unwrap_or_else(|| journal.content().to_string())
            .trim()
            .to_string();
        if text.chars().count() < MIN_EVALUATION_CHARS {
            return Err(DomainError::validation(
                "text",
                format!("Text must be at least {} characters", MIN_EVALUATION_CHARS),
            ));
        }

        // 2. Ask the evaluation policy
        let value = self
            .ai
            .invoke(PolicyRequest::json(evaluation_prompt(&text), ModelTier::Lite))
            .await
            .and_then(PolicyOutput::into_json)
            .map_err(|e| {
                warn!(journal_id = %journal.id(), error = %e, "Evaluation policy failed");
                DomainError::new(
                    ErrorCode::AIServiceUnavailable,
                    "Feedback is unavailable right now, please try again",
                )
            })?;
        let feedback = EvaluationFeedback::from_value(&value);

        // 3. Fold items into the ledger
        let entries = self
            .recorder
            .handle(RecordFeedbackCommand {
                user_id: cmd.user_id.clone(),
                items: feedback.feedback_items.clone(),
            })
            .await?;

        // 4. Transcript and metrics
        if cmd.record_summary && !feedback.high_level_summary.trim().is_empty() {
            let message = ChatMessage::feedback(*journal.id(), feedback.high_level_summary.trim());
            self.journals.append_message(&message).await?;
        }
        journal.set_completion_metrics(json!({
            "high_level_summary": feedback.high_level_summary,
            "feedback_item_count": feedback.feedback_items.len(),
            "recorded_count": entries.len(),
            "evaluated_at": Timestamp::now(),
        }));
        self.journals.update(&journal).await?;

        info!(
            journal_id = %journal.id(),
            items = feedback.feedback_items.len(),
            "Journal evaluated"
        );
        Ok(EvaluateJournalResult { feedback, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::memory::{InMemoryErrorLedger, InMemoryJournalRepository};
    use crate::domain::foundation::ErrorCategory;
    use crate::domain::journal::{Journal, MessageType};
    use crate::ports::AIError;
    use chrono::NaiveDate;

    struct Fixture {
        journals: Arc<InMemoryJournalRepository>,
        ledger: Arc<InMemoryErrorLedger>,
        journal_id: JournalId,
    }

    impl Fixture {
        async fn new(content: &str) -> Self {
            let journals = Arc::new(InMemoryJournalRepository::new());
            let mut journal = Journal::new(
                JournalId::new(),
                UserId::new("learner").unwrap(),
                NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
            );
            journal.replace_draft(content.to_string(), None);
            journals.create(&journal).await.unwrap();
            Self {
                journals,
                ledger: Arc::new(InMemoryErrorLedger::new()),
                journal_id: *journal.id(),
            }
        }

        fn handler(&self, ai: MockAIProvider) -> EvaluateJournalHandler {
            EvaluateJournalHandler::new(self.journals.clone(), self.ledger.clone(), Arc::new(ai))
        }

        fn command(&self, text: Option<&str>, record_summary: bool) -> EvaluateJournalCommand {
            EvaluateJournalCommand {
                user_id: UserId::new("learner").unwrap(),
                journal_id: self.journal_id,
                text: text.map(str::to_string),
                record_summary,
            }
        }
    }

    fn reply() -> serde_json::Value {
        json!({
            "high_level_summary": "A lively entry.",
            "feedback_items": [
                {"category": "Grammar", "incorrect_phrase": "he go", "suggestion": "he goes", "explanation": "Third person -s."},
                {"category": "Spelling", "incorrect_phrase": "recieve", "suggestion": "receive", "explanation": "i before e."}
            ]
        })
    }

    #[tokio::test]
    async fn evaluates_draft_and_records_ledger() {
        let fx = Fixture::new("Yesterday he go to school and recieve a prize.").await;
        let ai = MockAIProvider::new().with_json(reply());

        let result = fx.handler(ai.clone()).handle(fx.command(None, true)).await.unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(fx.ledger.counts().await, (2, 2, 2, 2));
        assert!(ai.calls()[0].prompt.contains("he go to school"));

        let messages = fx.journals.messages(&fx.journal_id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_type, MessageType::Feedback);
        assert_eq!(messages[0].text, "A lively entry.");

        let stored = fx.journals.find_by_id(&fx.journal_id).await.unwrap().unwrap();
        let metrics = stored.completion_metrics().unwrap();
        assert_eq!(metrics["feedback_item_count"], 2);
    }

    #[tokio::test]
    async fn explicit_text_overrides_draft_and_summary_is_optional() {
        let fx = Fixture::new("").await;
        let ai = MockAIProvider::new().with_json(reply());

        fx.handler(ai.clone())
            .handle(fx.command(Some("An explicit paragraph to check."), false))
            .await
            .unwrap();

        assert!(ai.calls()[0].prompt.contains("An explicit paragraph"));
        assert!(fx.journals.messages(&fx.journal_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_text_is_rejected_without_calling_ai() {
        let fx = Fixture::new("   too short   ").await;
        let ai = MockAIProvider::new();

        let err = fx.handler(ai.clone()).handle(fx.command(None, true)).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn ai_failure_is_service_unavailable_and_writes_nothing() {
        let fx = Fixture::new("A long enough journal entry.").await;
        let ai = MockAIProvider::new().with_error(AIError::Exhausted {
            attempts: 3,
            last_error: "down".to_string(),
        });

        let err = fx.handler(ai).handle(fx.command(None, true)).await.unwrap_err();

        assert_eq!(err.category(), ErrorCategory::ServiceUnavailable);
        assert_eq!(fx.ledger.counts().await, (0, 0, 0, 0));
        let stored = fx.journals.find_by_id(&fx.journal_id).await.unwrap().unwrap();
        assert!(stored.completion_metrics().is_none());
    }

    #[tokio::test]
    async fn unparsable_reply_is_service_unavailable() {
        let fx = Fixture::new("A long enough journal entry.").await;
        let ai = MockAIProvider::new().with_text("I cannot do that.");

        let err = fx.handler(ai).handle(fx.command(None, false)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AIServiceUnavailable);
    }
}
