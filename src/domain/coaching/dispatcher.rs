//! Applies coach actions to a journal.

use tracing::warn;

use super::CoachAction;
use crate::domain::journal::Journal;

/// Reply used when the coach returned something we cannot act on.
pub const DEFAULT_REPLY: &str = "I'm not sure how to respond.";

/// What applying an action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Text of the AI message to persist.
    pub reply_text: String,
    /// True if the journal outline was mutated.
    pub outline_changed: bool,
}

/// Maps each action to its effect on the journal and the reply text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionDispatcher;

impl ActionDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, action: &CoachAction, journal: &mut Journal) -> DispatchOutcome {
        match action {
            CoachAction::AskQuestion { question, .. } => DispatchOutcome {
                reply_text: question.clone(),
                outline_changed: false,
            },
            CoachAction::AddToOutline {
                text_to_add,
                follow_up_question,
            } => {
                journal.append_to_outline(text_to_add);
                DispatchOutcome {
                    reply_text: follow_up_question.clone(),
                    outline_changed: true,
                }
            }
            CoachAction::SuggestTopics { intro, topics } => DispatchOutcome {
                reply_text: format_topics(intro, topics),
                outline_changed: false,
            },
            CoachAction::Unrecognized { tag, reason } => {
                warn!(
                    journal_id = %journal.id(),
                    tag = tag.as_deref().unwrap_or("<none>"),
                    reason = %reason,
                    "Unrecognized coach action, using default reply"
                );
                DispatchOutcome {
                    reply_text: DEFAULT_REPLY.to_string(),
                    outline_changed: false,
                }
            }
        }
    }
}

fn format_topics(intro: &str, topics: &[String]) -> String {
    if topics.is_empty() {
        return intro.to_string();
    }
    let list = topics
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");
    if intro.is_empty() {
        list
    } else {
        format!("{}\n\n{}", intro, list)
    }
}
