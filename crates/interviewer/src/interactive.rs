//! Interactive terminal front end.
//!
//! Drives an [`InterviewSession`] by phase: collect interview details, chat,
//! then show feedback.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Select};

use interviewer_core::{
    Intent, InterviewPhase, InterviewSession, PaymentMethod, PaymentProvider, SessionError,
    SignInProvider,
};
use interviewer_prompts::{find_language, ConfigEdit, InterviewConfig};

use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Editable interview fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    CandidateName,
    CompanyName,
    JobRole,
    CompanyUrl,
    Language,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::CandidateName,
        Field::CompanyName,
        Field::JobRole,
        Field::CompanyUrl,
        Field::Language,
    ];

    fn label(&self) -> &'static str {
        match self {
            Field::CandidateName => "Your name",
            Field::CompanyName => "Company name",
            Field::JobRole => "Job role",
            Field::CompanyUrl => "Company website URL",
            Field::Language => "Interview language",
        }
    }

    fn value<'a>(&self, config: &'a InterviewConfig) -> &'a str {
        match self {
            Field::CandidateName => &config.candidate_name,
            Field::CompanyName => &config.company_name,
            Field::JobRole => &config.job_role,
            Field::CompanyUrl => &config.company_url,
            Field::Language => &config.language,
        }
    }

    fn edit(&self, value: String) -> ConfigEdit {
        match self {
            Field::CandidateName => ConfigEdit::CandidateName(value),
            Field::CompanyName => ConfigEdit::CompanyName(value),
            Field::JobRole => ConfigEdit::JobRole(value),
            Field::CompanyUrl => ConfigEdit::CompanyUrl(value),
            Field::Language => ConfigEdit::Language(value),
        }
    }
}

/// Ask which provider to sign in with
pub fn choose_sign_in() -> Result<SignInProvider> {
    let items: Vec<String> = SignInProvider::ALL
        .iter()
        .map(|p| format!("Continue with {}", p))
        .collect();
    let selection = Select::new()
        .with_prompt("Sign in")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(SignInProvider::ALL[selection])
}

/// Run the session until the user quits
pub async fn run(
    session: &InterviewSession,
    payments: &dyn PaymentProvider,
    json_output: bool,
) -> Result<()> {
    loop {
        let flow = match session.view().phase {
            InterviewPhase::Config => configure_and_start(session, payments).await?,
            InterviewPhase::InProgress | InterviewPhase::GeneratingFeedback => {
                converse(session, payments).await?
            }
            InterviewPhase::Ended => review(session, json_output).await?,
        };
        if flow == Flow::Quit {
            if let Some(path) = session.transcript_path() {
                eprintln!("Transcript saved to {}", path.display().to_string().dimmed());
            }
            return Ok(());
        }
    }
}

async fn configure_and_start(
    session: &InterviewSession,
    payments: &dyn PaymentProvider,
) -> Result<Flow> {
    fill_missing_fields(session).await?;

    let view = session.view();
    render::print_summary(&view);

    let choice = Select::new()
        .with_prompt("Ready?")
        .items(&[
            "Start interview (1 credit)",
            "Change details",
            "Buy credits",
            "Quit",
        ])
        .default(0)
        .interact()?;

    match choice {
        0 => start(session, payments).await,
        1 => {
            change_field(session).await?;
            Ok(Flow::Continue)
        }
        2 => {
            buy_credits(session, payments).await?;
            Ok(Flow::Continue)
        }
        _ => Ok(Flow::Quit),
    }
}

async fn start(session: &InterviewSession, payments: &dyn PaymentProvider) -> Result<Flow> {
    render::print_thinking();
    match session.dispatch(Intent::Start).await {
        Ok(view) => {
            if !render::print_view_error(&view) {
                if let Some(opening) = view.last_turn() {
                    render::print_turn(opening, &view.config.candidate_name);
                }
                render::print_help();
            }
            Ok(Flow::Continue)
        }
        Err(SessionError::InsufficientCredits) => {
            render::print_rejection(&SessionError::InsufficientCredits);
            buy_credits(session, payments).await?;
            Ok(Flow::Continue)
        }
        Err(e) => {
            render::print_rejection(&e);
            Ok(Flow::Continue)
        }
    }
}

async fn fill_missing_fields(session: &InterviewSession) -> Result<()> {
    for field in Field::ALL {
        let config = session.view().config;
        let missing = match field {
            Field::Language => find_language(&config.language).is_none(),
            _ => field.value(&config).trim().is_empty(),
        };
        if missing {
            let value = ask_field(field, "")?;
            apply_edit(session, field.edit(value)).await;
        }
    }
    Ok(())
}

async fn change_field(session: &InterviewSession) -> Result<()> {
    let config = session.view().config;
    let items: Vec<String> = Field::ALL
        .iter()
        .map(|f| format!("{}: {}", f.label(), f.value(&config)))
        .collect();
    let selection = Select::new()
        .with_prompt("Which detail?")
        .items(&items)
        .default(0)
        .interact()?;

    let field = Field::ALL[selection];
    let value = ask_field(field, field.value(&config))?;
    apply_edit(session, field.edit(value)).await;
    Ok(())
}

fn ask_field(field: Field, current: &str) -> Result<String> {
    let mut input = Input::<String>::new().with_prompt(field.label());
    if !current.is_empty() {
        input = input.with_initial_text(current);
    }

    let value = if field == Field::Language {
        let value = input
            .validate_with(|v: &String| -> Result<(), &'static str> {
                find_language(v)
                    .map(|_| ())
                    .ok_or("Unsupported language")
            })
            .interact_text()?;
        find_language(&value).unwrap_or(value.as_str()).to_string()
    } else {
        input
            .validate_with(|v: &String| -> Result<(), &'static str> {
                if v.trim().is_empty() {
                    Err("This field is required")
                } else {
                    Ok(())
                }
            })
            .interact_text()?
    };
    Ok(value.trim().to_string())
}

async fn apply_edit(session: &InterviewSession, edit: ConfigEdit) {
    if let Err(e) = session.dispatch(Intent::EditConfig(edit)).await {
        render::print_rejection(&e);
    }
}

async fn converse(session: &InterviewSession, payments: &dyn PaymentProvider) -> Result<Flow> {
    let candidate_name = session.view().config.candidate_name;
    let line: String = Input::new()
        .with_prompt(candidate_name.as_str())
        .allow_empty(true)
        .interact_text()?;

    match line.trim() {
        "/quit" => return Ok(Flow::Quit),
        "/reset" => {
            session.dispatch(Intent::Reset).await?;
        }
        "/buy" => {
            buy_credits(session, payments).await?;
        }
        "/end" => {
            eprintln!("{}", "Preparing your feedback...".dimmed());
            match session.dispatch(Intent::End).await {
                Ok(view) => {
                    render::print_view_error(&view);
                }
                Err(e) => render::print_rejection(&e),
            }
        }
        "" => render::print_help(),
        answer => {
            render::print_thinking();
            match session.dispatch(Intent::SendMessage(answer.to_string())).await {
                Ok(view) => {
                    if let Some(turn) = view.last_turn() {
                        render::print_turn(turn, &view.config.candidate_name);
                    }
                    render::print_view_error(&view);
                }
                Err(e) => render::print_rejection(&e),
            }
        }
    }
    Ok(Flow::Continue)
}

async fn review(session: &InterviewSession, json_output: bool) -> Result<Flow> {
    let view = session.view();
    if let Some(ref report) = view.feedback {
        if json_output {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else {
            render::print_feedback(report);
        }
    }
    if let Some(path) = session.transcript_path() {
        eprintln!("Transcript saved to {}", path.display().to_string().dimmed());
    }

    let choice = Select::new()
        .with_prompt("What next?")
        .items(&["Start a new interview", "Quit"])
        .default(0)
        .interact()?;

    if choice == 0 {
        session.dispatch(Intent::Reset).await?;
        Ok(Flow::Continue)
    } else {
        Ok(Flow::Quit)
    }
}

/// Run the simulated payment flow; returns whether credits were added
async fn buy_credits(session: &InterviewSession, payments: &dyn PaymentProvider) -> Result<bool> {
    let mut items: Vec<String> = PaymentMethod::ALL.iter().map(|m| m.to_string()).collect();
    items.push("Cancel".to_string());

    let selection = Select::new()
        .with_prompt("Buy 10 credits with")
        .items(&items)
        .default(0)
        .interact()?;
    let Some(&method) = PaymentMethod::ALL.get(selection) else {
        return Ok(false);
    };

    let receipt = payments.purchase_credits(method).await;
    let view = session.dispatch(Intent::BuyCreditsCompleted).await?;
    eprintln!(
        "{} Added {} credits via {} (balance: {})",
        "✓".bright_green(),
        receipt.credits,
        receipt.method,
        view.credits
    );
    Ok(true)
}
