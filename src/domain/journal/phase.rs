//! Writing phase of a journal entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Stage of the writing session a journal is in.
///
/// Phases progress forward only. Skipping ahead is allowed, so a learner
/// can jump straight from scaffolding to evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritingPhase {
    Scaffolding,
    Writing,
    Evaluation,
    Completed,
}

impl WritingPhase {
    /// All phases in progression order.
    pub const ALL: [WritingPhase; 4] = [
        WritingPhase::Scaffolding,
        WritingPhase::Writing,
        WritingPhase::Evaluation,
        WritingPhase::Completed,
    ];

    fn rank(&self) -> u8 {
        match self {
            WritingPhase::Scaffolding => 0,
            WritingPhase::Writing => 1,
            WritingPhase::Evaluation => 2,
            WritingPhase::Completed => 3,
        }
    }

    /// Returns true if the conversational turn path accepts messages in this phase.
    pub fn accepts_turns(&self) -> bool {
        matches!(self, WritingPhase::Scaffolding | WritingPhase::Writing)
    }

    /// Wire name of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            WritingPhase::Scaffolding => "scaffolding",
            WritingPhase::Writing => "writing",
            WritingPhase::Evaluation => "evaluation",
            WritingPhase::Completed => "completed",
        }
    }
}

impl Default for WritingPhase {
    fn default() -> Self {
        WritingPhase::Scaffolding
    }
}

impl StateMachine for WritingPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        target.rank() > self.rank()
    }

    fn valid_transitions(&self) -> Vec<Self> {
        Self::ALL
            .into_iter()
            .filter(|p| self.can_transition_to(p))
            .collect()
    }
}

impl fmt::Display for WritingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WritingPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scaffolding" => Ok(WritingPhase::Scaffolding),
            "writing" => Ok(WritingPhase::Writing),
            "evaluation" => Ok(WritingPhase::Evaluation),
            "completed" => Ok(WritingPhase::Completed),
            other => Err(ValidationError::invalid_format(
                "writing_phase",
                format!("unknown phase '{}'", other),
            )),
        }
    }
}
