use interviewer_logging::GenerationStage;
use serde::Serialize;
use thiserror::Error;

use crate::InterviewPhase;

/// Reply appended to the transcript when a follow-up question cannot be generated
pub const APOLOGY_TURN: &str =
    "I'm sorry, I've encountered a technical issue. Could you please rephrase your last answer?";

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionError {
    #[error("Not enough credits to start an interview")]
    InsufficientCredits,

    #[error("Interview configuration is incomplete: missing {}", .missing.join(", "))]
    IncompleteConfig { missing: Vec<String> },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Another request is still in progress")]
    Busy,

    #[error("{intent} is not allowed while the session is {phase}")]
    WrongPhase {
        intent: &'static str,
        phase: InterviewPhase,
    },

    #[error("Generation failed during {stage:?}: {message}")]
    Generation {
        stage: GenerationStage,
        message: String,
    },
}

impl SessionError {
    /// Text shown to the user
    pub fn user_message(&self) -> String {
        match self {
            SessionError::InsufficientCredits => {
                "You don't have enough credits to start an interview.".to_string()
            }
            SessionError::Generation { stage, .. } => match stage {
                GenerationStage::Opening => "Failed to start the interview. Please try again.",
                GenerationStage::FollowUp => {
                    "Failed to get a follow-up question. Please try again."
                }
                GenerationStage::Feedback => "Failed to generate feedback report.",
            }
            .to_string(),
            other => other.to_string(),
        }
    }
}
