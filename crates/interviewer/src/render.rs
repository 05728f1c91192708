use colored::Colorize;

use interviewer_core::{SessionError, SessionView, SignInProvider};
use interviewer_prompts::{ChatMessage, FeedbackReport, INTERVIEWER_LABEL};

use crate::Settings;

pub fn print_dry_run(settings: &Settings) {
    println!("=== Dry Run ===");
    println!("Provider: {}", settings.provider);
    println!("Model: {}", settings.model);
    println!("API key from: ${}", settings.api_key_env);
    if let Some(ref base_url) = settings.base_url {
        println!("Base URL: {}", base_url);
    }
    println!("Timeout: {}s", settings.timeout.as_secs());
    println!("Starting credits: {}", settings.starting_credits);
    println!(
        "Transcripts: {}",
        if settings.transcripts { "on" } else { "off" }
    );

    let interview = &settings.interview;
    println!("Candidate: {}", or_unset(&interview.candidate_name));
    println!("Company: {}", or_unset(&interview.company_name));
    println!("Role: {}", or_unset(&interview.job_role));
    println!("Company URL: {}", or_unset(&interview.company_url));
    println!("Language: {}", interview.language);
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(will ask)"
    } else {
        value
    }
}

pub fn print_signed_in(provider: SignInProvider) {
    eprintln!("{} Signed in with {}", "✓".bright_green(), provider);
}

/// Interview details and balance shown before starting
pub fn print_summary(view: &SessionView) {
    let config = &view.config;
    eprintln!();
    eprintln!("{}", "Interview".bold());
    eprintln!("  {:<10} {}", "Candidate".dimmed(), config.candidate_name);
    eprintln!("  {:<10} {}", "Company".dimmed(), config.company_name);
    eprintln!("  {:<10} {}", "Role".dimmed(), config.job_role);
    eprintln!("  {:<10} {}", "Website".dimmed(), config.company_url);
    eprintln!("  {:<10} {}", "Language".dimmed(), config.language);
    eprintln!("  {:<10} {}", "Credits".dimmed(), credits_label(view.credits));
    eprintln!();
}

fn credits_label(credits: u32) -> String {
    match credits {
        0 => "0 (buy more to start)".bright_red().to_string(),
        1 => "1".bright_yellow().to_string(),
        n => n.to_string(),
    }
}

pub fn print_turn(message: &ChatMessage, candidate_name: &str) {
    if message.is_user() {
        eprintln!("{}: {}", candidate_name.bold(), message.content);
    } else {
        eprintln!();
        eprintln!("{}", format!("{}:", INTERVIEWER_LABEL).bright_cyan().bold());
        eprintln!("{}", message.content);
        eprintln!();
    }
}

pub fn print_thinking() {
    eprintln!("{}", "Interviewer is thinking...".dimmed());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".bright_red(), message);
}

/// Show a local rejection in user terms
pub fn print_rejection(error: &SessionError) {
    print_error(&error.user_message());
}

/// Show the error recorded in a view, if any
pub fn print_view_error(view: &SessionView) -> bool {
    match view.error_message() {
        Some(message) => {
            print_error(&message);
            true
        }
        None => false,
    }
}

pub fn print_help() {
    eprintln!(
        "{}",
        "Type your answer and press Enter. Commands: /end (finish and get feedback), /reset, /buy, /quit"
            .dimmed()
    );
}

pub fn print_feedback(report: &FeedbackReport) {
    eprintln!();
    eprintln!("{}", "=== Interview Feedback ===".bold());
    eprintln!("Score: {}", score_label(report.score));

    for section in report.sections() {
        eprintln!();
        match section.title {
            Some(title) => {
                eprintln!("{}", title.as_str().bright_cyan().bold());
                eprintln!("{}", section.body);
            }
            None => eprintln!("{}", section.body.dimmed()),
        }
    }
    eprintln!();
}

fn score_label(score: i64) -> String {
    let label = format!("{}/100", score);
    match score {
        80..=i64::MAX => label.bright_green().bold().to_string(),
        50..=79 => label.bright_yellow().bold().to_string(),
        _ => label.bright_red().bold().to_string(),
    }
}
