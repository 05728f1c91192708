use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::time::timeout;
use tracing::{debug, info, warn};

use interviewer_llm::{GenerationError, GenerationOutput, LanguageModel};
use interviewer_logging::{GenerationStage, LogEvent, Logger, TranscriptHeader, TranscriptWriter};
use interviewer_prompts::{
    ChatMessage, ConfigEdit, FeedbackReport, InterviewConfig, InterviewPrompts, StructuredRequest,
};

use crate::credits::{CreditLedger, TOP_UP_CREDITS};
use crate::error::{SessionError, APOLOGY_TURN};
use crate::intent::Intent;
use crate::profile::{ProfileStore, UserProfile};
use crate::state::{InterviewPhase, SessionState, SessionView};

/// Default bound on a single model call
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where session transcripts are recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TranscriptOutput {
    #[default]
    Disabled,
    /// `<data dir>/interviewer/sessions`
    DataDir,
    Dir(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub request_timeout: Duration,
    pub transcripts: TranscriptOutput,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            transcripts: TranscriptOutput::Disabled,
        }
    }
}

/// One interview session: phase, transcript and error state, driven by intents.
///
/// State is only touched before and after the single model call an intent
/// makes; the lock is never held across that call. While a call is
/// outstanding `Start`, `SendMessage`, `End` and `EditConfig` are rejected
/// with [`SessionError::Busy`]. `Reset` is always accepted and invalidates
/// the outstanding call, whose result is then dropped.
pub struct InterviewSession {
    model: Arc<dyn LanguageModel>,
    logger: Arc<Logger>,
    credits: Arc<CreditLedger>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
}

impl InterviewSession {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        logger: Arc<Logger>,
        credits: Arc<CreditLedger>,
        config: InterviewConfig,
    ) -> Self {
        Self {
            model,
            logger,
            credits,
            settings: SessionSettings::default(),
            state: Mutex::new(SessionState::new(config)),
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current snapshot for rendering
    pub fn view(&self) -> SessionView {
        self.lock().view(self.credits.balance())
    }

    /// Path of the transcript being recorded, if any
    pub fn transcript_path(&self) -> Option<PathBuf> {
        self.lock()
            .transcript_writer
            .as_ref()
            .map(|w| w.path().to_path_buf())
    }

    /// Apply an intent and return the resulting state.
    ///
    /// `Err` means a guard rejected the intent before any model call was
    /// made. Model failures are not errors here: they are reported through
    /// [`SessionView::error`].
    pub async fn dispatch(&self, intent: Intent) -> Result<SessionView, SessionError> {
        let name = intent.name();
        debug!(intent = name, "Dispatching intent");

        let result = match intent {
            Intent::Start => self.start().await,
            Intent::SendMessage(text) => self.send_message(&text).await,
            Intent::End => self.end().await,
            Intent::Reset => {
                self.reset();
                Ok(())
            }
            Intent::BuyCreditsCompleted => {
                self.buy_credits_completed();
                Ok(())
            }
            Intent::EditConfig(edit) => self.edit_config(edit),
        };

        match result {
            Ok(()) => Ok(self.view()),
            Err(e) => {
                self.logger.log(&LogEvent::IntentRejected {
                    intent: name.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Prefill the candidate name from a stored profile. Failures are logged
    /// and otherwise ignored.
    pub fn prefill_from_profile(&self, store: &dyn ProfileStore) -> Option<UserProfile> {
        match store.load_profile() {
            Ok(Some(profile)) => {
                self.apply_profile(&profile);
                Some(profile)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                None
            }
        }
    }

    /// Remember the candidate name in the profile store and use it for this
    /// session. Other profile data is kept.
    pub fn remember_candidate_name(&self, store: &dyn ProfileStore, name: &str) {
        let name = name.trim();
        if let Err(e) = store.update_name(name) {
            warn!(error = %e, "Failed to save profile");
        }
        self.apply_profile(&UserProfile::new(name));
    }

    fn apply_profile(&self, profile: &UserProfile) {
        let mut state = self.lock();
        if state.phase != InterviewPhase::Config
            || state.awaiting_response
            || profile.name.trim().is_empty()
        {
            return;
        }
        let config = std::mem::take(&mut state.config);
        state.config = config.with_candidate_name(profile.name.trim());
    }

    async fn start(&self) -> Result<(), SessionError> {
        let (prompt, epoch) = {
            let mut state = self.lock();
            ensure_idle(&state)?;
            ensure_phase(&state, "start", &[InterviewPhase::Config])?;

            if self.credits.balance() == 0 {
                state.error = Some(SessionError::InsufficientCredits);
                return Err(SessionError::InsufficientCredits);
            }

            let missing = state.config.missing_fields();
            if !missing.is_empty() {
                return Err(SessionError::IncompleteConfig {
                    missing: missing.into_iter().map(String::from).collect(),
                });
            }

            // Another session sharing the ledger may have taken the last credit
            if !self.credits.try_reserve() {
                state.error = Some(SessionError::InsufficientCredits);
                return Err(SessionError::InsufficientCredits);
            }

            state.transcript.clear();
            state.feedback = None;
            state.error = None;
            state.awaiting_response = true;
            (
                InterviewPrompts::build_opening_prompt(&state.config),
                state.epoch,
            )
        };

        let result = self.generate_text(GenerationStage::Opening, &prompt).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            self.credits.refund();
            debug!("Discarding opening question from a reset session");
            return Ok(());
        }
        state.awaiting_response = false;

        match result {
            Ok(question) => {
                let session_id = uuid::Uuid::new_v4().to_string();
                state.transcript_writer = self.open_transcript(&session_id, &state.config);
                state.session_id = Some(session_id);
                state.started_at = Some(Instant::now());
                state.phase = InterviewPhase::InProgress;
                state.push_turn(ChatMessage::model(question));

                self.logger.log(&LogEvent::SessionStarted {
                    candidate: state.config.candidate_name.clone(),
                    company: state.config.company_name.clone(),
                    role: state.config.job_role.clone(),
                    language: state.config.language.clone(),
                    credits_remaining: self.credits.balance(),
                });
            }
            Err(e) => {
                self.credits.refund();
                state.error = Some(SessionError::Generation {
                    stage: GenerationStage::Opening,
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<(), SessionError> {
        let (prompt, epoch) = {
            let mut state = self.lock();
            ensure_idle(&state)?;
            ensure_phase(&state, "send_message", &[InterviewPhase::InProgress])?;

            let text = text.trim();
            if text.is_empty() {
                return Err(SessionError::InvalidInput {
                    reason: "message is empty".to_string(),
                });
            }

            state.push_turn(ChatMessage::user(text));
            state.error = None;
            self.logger.log(&LogEvent::CandidateAnswered {
                turn: state.transcript.len(),
                chars: text.chars().count(),
            });

            let prompt =
                InterviewPrompts::build_follow_up_prompt(&state.config, &state.transcript)
                    .map_err(|e| SessionError::InvalidInput {
                        reason: e.to_string(),
                    })?;
            state.awaiting_response = true;
            (prompt, state.epoch)
        };

        let result = self.generate_text(GenerationStage::FollowUp, &prompt).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("Discarding follow-up question from a reset session");
            return Ok(());
        }
        state.awaiting_response = false;

        match result {
            Ok(question) => state.push_turn(ChatMessage::model(question)),
            Err(e) => {
                state.push_turn(ChatMessage::model(APOLOGY_TURN));
                state.error = Some(SessionError::Generation {
                    stage: GenerationStage::FollowUp,
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn end(&self) -> Result<(), SessionError> {
        let (request, epoch) = {
            let mut state = self.lock();
            ensure_idle(&state)?;
            ensure_phase(
                &state,
                "end",
                &[InterviewPhase::InProgress, InterviewPhase::GeneratingFeedback],
            )?;

            if state.transcript.is_empty() {
                self.reset_state(&mut state);
                return Ok(());
            }

            state.phase = InterviewPhase::GeneratingFeedback;
            state.error = None;
            state.awaiting_response = true;
            (
                InterviewPrompts::build_feedback_prompt(&state.config, &state.transcript),
                state.epoch,
            )
        };

        let result = self.generate_feedback(&request).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            debug!("Discarding feedback from a reset session");
            return Ok(());
        }
        state.awaiting_response = false;

        match result {
            Ok(feedback) => {
                self.logger.log(&LogEvent::FeedbackReady {
                    score: feedback.score,
                    sections: feedback.sections().len(),
                });
                if let Some(writer) = state.transcript_writer.take() {
                    writer.write_end(
                        "completed",
                        state.transcript.len(),
                        Some(feedback.score),
                        state.elapsed_secs(),
                    );
                }
                state.feedback = Some(feedback);
                state.phase = InterviewPhase::Ended;
            }
            Err(e) => {
                state.phase = InterviewPhase::InProgress;
                state.error = Some(SessionError::Generation {
                    stage: GenerationStage::Feedback,
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }

    fn reset(&self) {
        let mut state = self.lock();
        self.reset_state(&mut state);
    }

    fn reset_state(&self, state: &mut SessionState) {
        if let Some(writer) = state.transcript_writer.take() {
            writer.write_end("reset", state.transcript.len(), None, state.elapsed_secs());
        }

        state.config = state.config.reset();
        state.phase = InterviewPhase::Config;
        state.transcript.clear();
        state.feedback = None;
        state.error = None;
        state.awaiting_response = false;
        state.session_id = None;
        state.started_at = None;
        state.epoch += 1;

        self.logger.log(&LogEvent::SessionReset {
            candidate: state.config.candidate_name.clone(),
        });
    }

    fn edit_config(&self, edit: ConfigEdit) -> Result<(), SessionError> {
        let mut state = self.lock();
        ensure_idle(&state)?;
        ensure_phase(&state, "edit_config", &[InterviewPhase::Config])?;
        let config = std::mem::take(&mut state.config);
        state.config = config.apply(edit);
        Ok(())
    }

    fn buy_credits_completed(&self) {
        let balance = self.credits.top_up(TOP_UP_CREDITS);

        let mut state = self.lock();
        if state.error == Some(SessionError::InsufficientCredits) {
            state.error = None;
        }

        self.logger.log(&LogEvent::CreditsAdded {
            amount: TOP_UP_CREDITS,
            balance,
        });
    }

    async fn generate_text(
        &self,
        stage: GenerationStage,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        self.log_generation_started(stage, prompt);

        let result = match timeout(self.settings.request_timeout, self.model.generate_text(prompt))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.settings.request_timeout)),
        }
        .and_then(|output| {
            if output.content.trim().is_empty() {
                Err(GenerationError::EmptyResponse)
            } else {
                Ok(output)
            }
        });

        self.log_generation_outcome(stage, &result, |text| text.chars().count());
        result.map(|output| output.content.trim().to_string())
    }

    async fn generate_feedback(
        &self,
        request: &StructuredRequest,
    ) -> Result<FeedbackReport, GenerationError> {
        let stage = GenerationStage::Feedback;
        self.log_generation_started(stage, &request.prompt);

        let call = self
            .model
            .generate_structured(&request.prompt, &request.schema);
        let result = match timeout(self.settings.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.settings.request_timeout)),
        }
        .and_then(|output| {
            let duration = output.duration;
            let report = FeedbackReport::from_value(output.into_content())
                .map_err(|e| GenerationError::Schema(e.to_string()))?;
            Ok(GenerationOutput::new(report, duration))
        });

        self.log_generation_outcome(stage, &result, |report| report.report.chars().count());

        let feedback = result?.into_content();
        if !feedback.score_in_range() {
            warn!(score = feedback.score, "Feedback score is outside 0-100");
        }
        Ok(feedback)
    }

    fn log_generation_started(&self, stage: GenerationStage, prompt: &str) {
        self.logger.log(&LogEvent::GenerationStarted {
            stage,
            prompt_preview: prompt.chars().take(100).collect(),
        });
    }

    fn log_generation_outcome<T>(
        &self,
        stage: GenerationStage,
        result: &Result<GenerationOutput<T>, GenerationError>,
        chars: impl Fn(&T) -> usize,
    ) {
        let event = match result {
            Ok(output) => LogEvent::GenerationCompleted {
                stage,
                duration_secs: output.duration.as_secs_f64(),
                chars: chars(&output.content),
            },
            Err(e) => {
                warn!(?stage, error = %e, "Generation failed");
                LogEvent::GenerationFailed {
                    stage,
                    error: e.to_string(),
                }
            }
        };
        self.logger.log(&event);
    }

    fn open_transcript(
        &self,
        session_id: &str,
        config: &InterviewConfig,
    ) -> Option<Arc<TranscriptWriter>> {
        let writer = match &self.settings.transcripts {
            TranscriptOutput::Disabled => return None,
            TranscriptOutput::DataDir => {
                TranscriptWriter::new(&config.company_name, &config.job_role)
            }
            TranscriptOutput::Dir(dir) => {
                TranscriptWriter::in_dir(dir, &config.company_name, &config.job_role)
            }
        };

        match writer {
            Ok(writer) => {
                writer.write_start(TranscriptHeader {
                    session_id,
                    candidate_name: &config.candidate_name,
                    company_name: &config.company_name,
                    job_role: &config.job_role,
                    company_url: &config.company_url,
                    language: &config.language,
                    model: self.model.name(),
                });
                info!(path = %writer.path().display(), "Recording transcript");
                Some(Arc::new(writer))
            }
            Err(e) => {
                warn!(error = %e, "Failed to create transcript file");
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn ensure_idle(state: &SessionState) -> Result<(), SessionError> {
    if state.awaiting_response {
        return Err(SessionError::Busy);
    }
    Ok(())
}

fn ensure_phase(
    state: &SessionState,
    intent: &'static str,
    allowed: &[InterviewPhase],
) -> Result<(), SessionError> {
    if allowed.contains(&state.phase) {
        return Ok(());
    }
    Err(SessionError::WrongPhase {
        intent,
        phase: state.phase,
    })
}
