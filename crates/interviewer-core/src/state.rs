use std::sync::Arc;
use std::time::Instant;

use interviewer_logging::TranscriptWriter;
use interviewer_prompts::{ChatMessage, FeedbackReport, InterviewConfig};
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Position of a session in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewPhase {
    Config,
    InProgress,
    GeneratingFeedback,
    Ended,
}

impl std::fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterviewPhase::Config => write!(f, "CONFIG"),
            InterviewPhase::InProgress => write!(f, "IN_PROGRESS"),
            InterviewPhase::GeneratingFeedback => write!(f, "GENERATING_FEEDBACK"),
            InterviewPhase::Ended => write!(f, "ENDED"),
        }
    }
}

/// Mutable state owned by a session
pub(crate) struct SessionState {
    pub config: InterviewConfig,
    pub phase: InterviewPhase,
    pub transcript: Vec<ChatMessage>,
    pub feedback: Option<FeedbackReport>,
    pub error: Option<SessionError>,
    pub awaiting_response: bool,
    /// Bumped on every reset; results from an older epoch are discarded
    pub epoch: u64,
    pub session_id: Option<String>,
    pub started_at: Option<Instant>,
    pub transcript_writer: Option<Arc<TranscriptWriter>>,
}

impl SessionState {
    pub fn new(config: InterviewConfig) -> Self {
        Self {
            config,
            phase: InterviewPhase::Config,
            transcript: Vec::new(),
            feedback: None,
            error: None,
            awaiting_response: false,
            epoch: 0,
            session_id: None,
            started_at: None,
            transcript_writer: None,
        }
    }

    /// Append a turn and mirror it to the transcript file
    pub fn push_turn(&mut self, message: ChatMessage) {
        if let Some(ref writer) = self.transcript_writer {
            let role = if message.is_user() { "user" } else { "model" };
            writer.write_turn(self.transcript.len() + 1, role, &message.content);
        }
        self.transcript.push(message);
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or_default()
    }

    pub fn view(&self, credits: u32) -> SessionView {
        SessionView {
            phase: self.phase,
            config: self.config.clone(),
            transcript: self.transcript.clone(),
            credits,
            error: self.error.clone(),
            feedback: self.feedback.clone(),
            is_awaiting_response: self.awaiting_response,
            session_id: self.session_id.clone(),
        }
    }
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: InterviewPhase,
    pub config: InterviewConfig,
    pub transcript: Vec<ChatMessage>,
    pub credits: u32,
    pub error: Option<SessionError>,
    pub feedback: Option<FeedbackReport>,
    pub is_awaiting_response: bool,
    pub session_id: Option<String>,
}

impl SessionView {
    /// User-facing error text, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(SessionError::user_message)
    }

    /// Most recent transcript entry
    pub fn last_turn(&self) -> Option<&ChatMessage> {
        self.transcript.last()
    }
}
