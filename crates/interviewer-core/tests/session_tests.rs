use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Notify;

use interviewer_core::{
    CreditLedger, InMemoryProfileStore, Intent, InterviewPhase, InterviewSession, ProfileStore,
    SessionError, SessionSettings, SessionView, TranscriptOutput, UserProfile, APOLOGY_TURN,
};
use interviewer_llm::{GenerationError, GenerationOutput, LanguageModel, ResponseSchema};
use interviewer_logging::{GenerationStage, Logger};
use interviewer_prompts::{ConfigEdit, InterviewConfig, Role, SectionTitle};

// ============================================================
// Scripted model
// ============================================================

enum Reply {
    Text(&'static str),
    Structured(Value),
    Fail,
    /// Wait for the notify, then answer with the text
    Gated(Arc<Notify>, &'static str),
    /// Never answer
    Hang,
}

#[derive(Default)]
struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Option<Reply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies.lock().unwrap().pop_front()
    }
}

fn unavailable() -> GenerationError {
    GenerationError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_text(&self, _prompt: &str) -> Result<GenerationOutput, GenerationError> {
        let text = match self.next() {
            Some(Reply::Text(text)) => text,
            Some(Reply::Gated(gate, text)) => {
                gate.notified().await;
                text
            }
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Fail) | None => return Err(unavailable()),
            Some(Reply::Structured(_)) => panic!("structured reply scripted for a text call"),
        };
        Ok(GenerationOutput::new(
            text.to_string(),
            Duration::from_millis(5),
        ))
    }

    async fn generate_structured(
        &self,
        _prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<GenerationOutput<Value>, GenerationError> {
        match self.next() {
            Some(Reply::Structured(value)) => {
                schema.validate(&value)?;
                Ok(GenerationOutput::new(value, Duration::from_millis(5)))
            }
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Fail) | None => Err(unavailable()),
            Some(_) => panic!("text reply scripted for a structured call"),
        }
    }
}

// ============================================================
// Helpers
// ============================================================

const OPENING: &str = "Welcome, Ada! What drew you to the Engineer role at Acme?";
const FOLLOW_UP: &str = "How did you keep the migration on schedule?";
const REPORT: &str = "**Overall Assessment:** Ada communicated clearly. \
**Key Strengths:** The migration example was concrete. \
**Areas for Improvement:** Quantify results using the STAR framework.";

fn ada_config() -> InterviewConfig {
    InterviewConfig::new("Ada", "Acme", "Engineer", "https://acme.example")
}

fn feedback(score: i64) -> Reply {
    Reply::Structured(json!({ "score": score, "report": REPORT }))
}

fn session_with(
    model: Arc<ScriptedModel>,
    credits: u32,
    config: InterviewConfig,
) -> InterviewSession {
    InterviewSession::new(
        model,
        Arc::new(Logger::silent()),
        Arc::new(CreditLedger::new(credits)),
        config,
    )
}

async fn started(model: Arc<ScriptedModel>, credits: u32) -> InterviewSession {
    let session = session_with(model, credits, ada_config());
    let view = session.dispatch(Intent::Start).await.unwrap();
    assert_eq!(view.phase, InterviewPhase::InProgress);
    session
}

async fn wait_until_awaiting(session: &InterviewSession) {
    while !session.view().is_awaiting_response {
        tokio::task::yield_now().await;
    }
}

fn roles(view: &SessionView) -> Vec<Role> {
    view.transcript.iter().map(|m| m.role).collect()
}

// ============================================================
// Start
// ============================================================

#[tokio::test]
async fn test_start_rejected_when_any_required_field_empty() {
    let configs = [
        ada_config().with_candidate_name(""),
        ada_config().with_company_name(""),
        ada_config().with_job_role(""),
        ada_config().with_company_url(""),
    ];

    for config in configs {
        let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
        let session = session_with(model.clone(), 5, config);

        let err = session.dispatch(Intent::Start).await.unwrap_err();

        assert!(matches!(err, SessionError::IncompleteConfig { ref missing } if missing.len() == 1));
        assert_eq!(model.calls(), 0);
        let view = session.view();
        assert_eq!(view.phase, InterviewPhase::Config);
        assert_eq!(view.credits, 5);
    }
}

#[tokio::test]
async fn test_start_without_credits_is_rejected() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = session_with(model.clone(), 0, ada_config());

    let err = session.dispatch(Intent::Start).await.unwrap_err();

    assert_eq!(err, SessionError::InsufficientCredits);
    assert_eq!(model.calls(), 0);
    let view = session.view();
    assert_eq!(view.credits, 0);
    assert_eq!(view.phase, InterviewPhase::Config);
    assert_eq!(
        view.error_message().as_deref(),
        Some("You don't have enough credits to start an interview.")
    );
}

#[tokio::test]
async fn test_successful_start_spends_one_credit() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = session_with(model, 3, ada_config());

    let view = session.dispatch(Intent::Start).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert_eq!(view.credits, 2);
    assert_eq!(roles(&view), vec![Role::Model]);
    assert_eq!(view.transcript[0].content, OPENING);
    assert!(view.error.is_none());
    assert!(!view.is_awaiting_response);
    assert!(view.session_id.is_some());
}

#[tokio::test]
async fn test_failed_start_keeps_credits() {
    let model = ScriptedModel::new(vec![Reply::Fail]);
    let session = session_with(model, 3, ada_config());

    let view = session.dispatch(Intent::Start).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::Config);
    assert_eq!(view.credits, 3);
    assert!(view.transcript.is_empty());
    assert_eq!(
        view.error_message().as_deref(),
        Some("Failed to start the interview. Please try again.")
    );
    assert!(!view.is_awaiting_response);
}

#[tokio::test]
async fn test_blank_opening_counts_as_failure() {
    let model = ScriptedModel::new(vec![Reply::Text("   ")]);
    let session = session_with(model, 1, ada_config());

    let view = session.dispatch(Intent::Start).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::Config);
    assert_eq!(view.credits, 1);
    assert!(view.transcript.is_empty());
}

#[tokio::test]
async fn test_retry_after_failed_start() {
    let model = ScriptedModel::new(vec![Reply::Fail, Reply::Text(OPENING)]);
    let session = session_with(model, 1, ada_config());

    session.dispatch(Intent::Start).await.unwrap();
    let view = session.dispatch(Intent::Start).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert_eq!(view.credits, 0);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_start_times_out() {
    let model = ScriptedModel::new(vec![Reply::Hang]);
    let session = session_with(model, 2, ada_config()).with_settings(SessionSettings {
        request_timeout: Duration::from_millis(20),
        ..Default::default()
    });

    let view = session.dispatch(Intent::Start).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::Config);
    assert_eq!(view.credits, 2);
    assert!(matches!(
        view.error,
        Some(SessionError::Generation {
            stage: GenerationStage::Opening,
            ..
        })
    ));
}

#[tokio::test]
async fn test_start_twice_is_wrong_phase() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = started(model.clone(), 2).await;

    let err = session.dispatch(Intent::Start).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::WrongPhase {
            phase: InterviewPhase::InProgress,
            ..
        }
    ));
    assert_eq!(model.calls(), 1);
    assert_eq!(session.view().credits, 1);
}

// ============================================================
// SendMessage
// ============================================================

#[tokio::test]
async fn test_messages_alternate_with_model_turns() {
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Text(FOLLOW_UP),
        Reply::Text("What would you do differently?"),
    ]);
    let session = started(model, 1).await;

    session
        .dispatch(Intent::SendMessage("  I led a migration project.  ".into()))
        .await
        .unwrap();
    let view = session
        .dispatch(Intent::SendMessage("We shipped in phases.".into()))
        .await
        .unwrap();

    assert_eq!(
        roles(&view),
        vec![Role::Model, Role::User, Role::Model, Role::User, Role::Model]
    );
    assert_eq!(view.transcript[1].content, "I led a migration project.");
    assert_eq!(view.transcript[2].content, FOLLOW_UP);
    assert_eq!(view.phase, InterviewPhase::InProgress);
}

#[tokio::test]
async fn test_blank_message_is_rejected_without_mutation() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING), Reply::Text(FOLLOW_UP)]);
    let session = started(model.clone(), 1).await;
    let before = session.view();

    for text in ["", "   ", "\n\t"] {
        let err = session
            .dispatch(Intent::SendMessage(text.into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput { .. }));
    }

    assert_eq!(session.view(), before);
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn test_follow_up_failure_appends_apology() {
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Fail,
        Reply::Text(FOLLOW_UP),
    ]);
    let session = started(model, 1).await;

    let view = session
        .dispatch(Intent::SendMessage("I led a migration project.".into()))
        .await
        .unwrap();

    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert_eq!(view.last_turn().unwrap().content, APOLOGY_TURN);
    assert_eq!(view.last_turn().unwrap().role, Role::Model);
    assert_eq!(
        view.error_message().as_deref(),
        Some("Failed to get a follow-up question. Please try again.")
    );
    assert!(!view.is_awaiting_response);

    // The conversation can continue and the error clears
    let view = session
        .dispatch(Intent::SendMessage("It took six months.".into()))
        .await
        .unwrap();
    assert_eq!(view.last_turn().unwrap().content, FOLLOW_UP);
    assert!(view.error.is_none());
    assert_eq!(view.transcript.len(), 5);
}

#[tokio::test]
async fn test_send_message_before_start_is_wrong_phase() {
    let model = ScriptedModel::new(vec![]);
    let session = session_with(model.clone(), 1, ada_config());

    let err = session
        .dispatch(Intent::SendMessage("hello".into()))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::WrongPhase { .. }));
    assert!(session.view().transcript.is_empty());
    assert_eq!(model.calls(), 0);
}

// ============================================================
// In-flight guard
// ============================================================

#[tokio::test]
async fn test_intents_rejected_while_call_outstanding() {
    let gate = Arc::new(Notify::new());
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Gated(gate.clone(), FOLLOW_UP),
    ]);
    let session = Arc::new(started(model.clone(), 1).await);

    let pending = {
        let session = session.clone();
        tokio::spawn(async move {
            session
                .dispatch(Intent::SendMessage("I led a migration project.".into()))
                .await
        })
    };
    wait_until_awaiting(&session).await;

    for intent in [
        Intent::SendMessage("another answer".into()),
        Intent::End,
        Intent::Start,
    ] {
        assert_eq!(session.dispatch(intent).await.unwrap_err(), SessionError::Busy);
    }
    assert_eq!(session.view().transcript.len(), 2);

    gate.notify_one();
    let view = pending.await.unwrap().unwrap();

    assert_eq!(view.transcript.len(), 3);
    assert_eq!(view.last_turn().unwrap().content, FOLLOW_UP);
    assert!(!view.is_awaiting_response);
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_reset_during_start_refunds_credit() {
    let gate = Arc::new(Notify::new());
    let model = ScriptedModel::new(vec![Reply::Gated(gate.clone(), OPENING)]);
    let session = Arc::new(session_with(model, 1, ada_config()));

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.dispatch(Intent::Start).await })
    };
    wait_until_awaiting(&session).await;
    assert_eq!(session.view().credits, 0);

    let view = session.dispatch(Intent::Reset).await.unwrap();
    assert_eq!(view.phase, InterviewPhase::Config);
    assert!(!view.is_awaiting_response);

    gate.notify_one();
    let view = pending.await.unwrap().unwrap();

    assert_eq!(view.phase, InterviewPhase::Config);
    assert!(view.transcript.is_empty());
    assert_eq!(view.credits, 1);
}

// ============================================================
// End
// ============================================================

#[tokio::test]
async fn test_end_stores_feedback() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING), feedback(78)]);
    let session = started(model, 1).await;

    let view = session.dispatch(Intent::End).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::Ended);
    let report = view.feedback.unwrap();
    assert_eq!(report.score, 78);
    assert!(report.score_in_range());
    assert_eq!(
        report.section(SectionTitle::KeyStrengths).as_deref(),
        Some("The migration example was concrete.")
    );
}

#[tokio::test]
async fn test_failed_feedback_reverts_and_can_retry() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING), Reply::Fail, feedback(64)]);
    let session = started(model, 1).await;

    let view = session.dispatch(Intent::End).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert!(view.feedback.is_none());
    assert_eq!(
        view.error_message().as_deref(),
        Some("Failed to generate feedback report.")
    );
    assert_eq!(view.transcript.len(), 1);

    let view = session.dispatch(Intent::End).await.unwrap();
    assert_eq!(view.phase, InterviewPhase::Ended);
    assert_eq!(view.feedback.unwrap().score, 64);
    assert!(view.error.is_none());
}

#[tokio::test]
async fn test_feedback_missing_report_is_schema_failure() {
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Structured(json!({ "score": 90 })),
    ]);
    let session = started(model, 1).await;

    let view = session.dispatch(Intent::End).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert!(view.feedback.is_none());
    assert!(matches!(
        view.error,
        Some(SessionError::Generation {
            stage: GenerationStage::Feedback,
            ..
        })
    ));
}

#[tokio::test]
async fn test_end_before_start_is_wrong_phase() {
    let model = ScriptedModel::new(vec![]);
    let session = session_with(model.clone(), 1, ada_config());

    let err = session.dispatch(Intent::End).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::WrongPhase {
            phase: InterviewPhase::Config,
            ..
        }
    ));
    assert_eq!(model.calls(), 0);
}

// ============================================================
// Reset, credits, config
// ============================================================

#[tokio::test]
async fn test_reset_clears_session_but_keeps_candidate_name() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING), feedback(70)]);
    let session = started(model, 2).await;
    session.dispatch(Intent::End).await.unwrap();

    let view = session.dispatch(Intent::Reset).await.unwrap();

    assert_eq!(view.phase, InterviewPhase::Config);
    assert!(view.transcript.is_empty());
    assert!(view.feedback.is_none());
    assert!(view.error.is_none());
    assert!(view.session_id.is_none());
    assert_eq!(view.config.candidate_name, "Ada");
    assert_eq!(view.config.company_name, "");
    assert_eq!(view.config.job_role, "");
    assert_eq!(view.config.company_url, "");
    assert_eq!(view.config.language, "English");
    assert_eq!(view.credits, 1);
}

#[tokio::test]
async fn test_buy_credits_adds_ten_in_any_phase() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = session_with(model, 0, ada_config());

    let view = session.dispatch(Intent::BuyCreditsCompleted).await.unwrap();
    assert_eq!(view.credits, 10);
    assert_eq!(view.phase, InterviewPhase::Config);

    session.dispatch(Intent::Start).await.unwrap();
    let view = session.dispatch(Intent::BuyCreditsCompleted).await.unwrap();
    assert_eq!(view.credits, 19);
    assert_eq!(view.phase, InterviewPhase::InProgress);
}

#[tokio::test]
async fn test_buy_credits_clears_insufficient_credits_error() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = session_with(model, 0, ada_config());
    session.dispatch(Intent::Start).await.unwrap_err();

    let view = session.dispatch(Intent::BuyCreditsCompleted).await.unwrap();
    assert!(view.error.is_none());

    let view = session.dispatch(Intent::Start).await.unwrap();
    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert_eq!(view.credits, 9);
}

#[tokio::test]
async fn test_sessions_share_the_credit_ledger() {
    let credits = Arc::new(CreditLedger::new(1));
    let logger = Arc::new(Logger::silent());
    let first = InterviewSession::new(
        ScriptedModel::new(vec![Reply::Text(OPENING)]),
        logger.clone(),
        credits.clone(),
        ada_config(),
    );
    let second = InterviewSession::new(
        ScriptedModel::new(vec![Reply::Text(OPENING)]),
        logger,
        credits.clone(),
        ada_config(),
    );

    first.dispatch(Intent::Start).await.unwrap();
    let err = second.dispatch(Intent::Start).await.unwrap_err();

    assert_eq!(err, SessionError::InsufficientCredits);
    assert_eq!(credits.balance(), 0);
}

#[tokio::test]
async fn test_edit_config_only_in_config_phase() {
    let model = ScriptedModel::new(vec![Reply::Text(OPENING)]);
    let session = session_with(model, 1, InterviewConfig::default());

    for edit in [
        ConfigEdit::CandidateName("Ada".into()),
        ConfigEdit::CompanyName("Acme".into()),
        ConfigEdit::JobRole("Engineer".into()),
        ConfigEdit::CompanyUrl("https://acme.example".into()),
        ConfigEdit::Language("French".into()),
    ] {
        session.dispatch(Intent::EditConfig(edit)).await.unwrap();
    }
    let view = session.dispatch(Intent::Start).await.unwrap();
    assert_eq!(view.config, ada_config().with_language("French"));

    let err = session
        .dispatch(Intent::EditConfig(ConfigEdit::JobRole("Manager".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::WrongPhase { .. }));
    assert_eq!(session.view().config.job_role, "Engineer");
}

#[tokio::test]
async fn test_profile_prefills_candidate_name() {
    let model = ScriptedModel::new(vec![]);
    let session = session_with(model, 1, InterviewConfig::default());
    let store = InMemoryProfileStore::with_profile(UserProfile::new("Grace"));

    let profile = session.prefill_from_profile(&store);

    assert_eq!(profile.unwrap().name, "Grace");
    assert_eq!(session.view().config.candidate_name, "Grace");

    session.remember_candidate_name(&store, " Ada ");
    assert_eq!(session.view().config.candidate_name, "Ada");
    assert_eq!(store.load_profile().unwrap().unwrap().name, "Ada");
}

#[tokio::test]
async fn test_remembered_name_keeps_stored_picture() {
    let model = ScriptedModel::new(vec![]);
    let session = session_with(model, 1, InterviewConfig::default());
    let store = InMemoryProfileStore::with_profile(UserProfile {
        name: "Grace".into(),
        picture: Some("data:image/png;base64,AAAA".into()),
    });

    session.remember_candidate_name(&store, "Ada");

    let stored = store.load_profile().unwrap().unwrap();
    assert_eq!(stored.name, "Ada");
    assert_eq!(stored.picture.as_deref(), Some("data:image/png;base64,AAAA"));
}

// ============================================================
// End-to-end
// ============================================================

#[tokio::test]
async fn test_ada_interview_end_to_end() {
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Text(FOLLOW_UP),
        feedback(82),
    ]);
    let config = ada_config().with_language("English");
    let session = session_with(model, 1, config);

    let view = session.dispatch(Intent::Start).await.unwrap();
    assert_eq!(view.credits, 0);
    assert_eq!(view.phase, InterviewPhase::InProgress);
    assert_eq!(roles(&view), vec![Role::Model]);

    let view = session
        .dispatch(Intent::SendMessage("I led a migration project.".into()))
        .await
        .unwrap();
    assert_eq!(view.transcript.len(), 3);
    assert_eq!(view.phase, InterviewPhase::InProgress);

    let view = session.dispatch(Intent::End).await.unwrap();
    assert_eq!(view.phase, InterviewPhase::Ended);
    let report = view.feedback.unwrap();
    assert!((0..=100).contains(&report.score));
    let titles: Vec<_> = report.sections().into_iter().filter_map(|s| s.title).collect();
    assert_eq!(
        titles,
        vec![
            SectionTitle::OverallAssessment,
            SectionTitle::KeyStrengths,
            SectionTitle::AreasForImprovement,
        ]
    );
}

#[tokio::test]
async fn test_transcript_recorded_to_directory() {
    let dir = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        Reply::Text(OPENING),
        Reply::Text(FOLLOW_UP),
        feedback(75),
    ]);
    let session = session_with(model, 1, ada_config()).with_settings(SessionSettings {
        transcripts: TranscriptOutput::Dir(dir.path().to_path_buf()),
        ..Default::default()
    });

    session.dispatch(Intent::Start).await.unwrap();
    let path = session.transcript_path().unwrap();
    session
        .dispatch(Intent::SendMessage("I led a migration project.".into()))
        .await
        .unwrap();
    session.dispatch(Intent::End).await.unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let types: Vec<&str> = lines.iter().map(|l| l["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["session_start", "turn", "turn", "turn", "session_end"]
    );
    assert_eq!(lines[0]["company_name"], "Acme");
    assert_eq!(lines[0]["model"], "scripted");
    assert_eq!(lines[2]["role"], "user");
    assert_eq!(lines[4]["outcome"], "completed");
    assert_eq!(lines[4]["score"], 75);
    assert!(session.transcript_path().is_none());
}
