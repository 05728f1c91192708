use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use interviewer_core::{
    AuthProvider, CreditLedger, InterviewSession, JsonProfileStore, SessionSettings,
    SimulatedAuth, SimulatedPayment, TranscriptOutput, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_STARTING_CREDITS,
};
use interviewer_llm::{create_model, ModelConfig, ModelProvider};
use interviewer_logging::{init_tracing, LogFormat, Logger};
use interviewer_prompts::{find_language, InterviewConfig, DEFAULT_LANGUAGE};

mod config;
mod interactive;
mod render;

use config::FileConfig;

#[derive(Parser, Debug)]
#[command(
    name = "interviewer",
    about = "Practice job interviews with an AI hiring manager",
    version,
    author
)]
struct Cli {
    /// Language model provider
    #[arg(long, value_enum)]
    provider: Option<ProviderChoice>,

    /// Model identifier (default depends on provider)
    #[arg(short, long)]
    model: Option<String>,

    /// Base URL for OpenAI-compatible servers
    #[arg(long)]
    base_url: Option<String>,

    /// Environment variable holding the API key
    #[arg(long)]
    api_key_env: Option<String>,

    /// Seconds to wait for each model reply
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Credits available at startup
    #[arg(long)]
    credits: Option<u32>,

    /// Candidate name
    #[arg(long)]
    name: Option<String>,

    /// Company you are interviewing with
    #[arg(long)]
    company: Option<String>,

    /// Job role
    #[arg(long)]
    role: Option<String>,

    /// Company website
    #[arg(long)]
    url: Option<String>,

    /// Interview language
    #[arg(long)]
    language: Option<String>,

    /// Path to config file (default: ./interviewer.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Also append JSON log events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Do not record a transcript of the session
    #[arg(long)]
    no_transcript: bool,

    /// Output the final feedback report as JSON
    #[arg(long)]
    json_output: bool,

    /// Dry run: show the effective configuration without starting
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderChoice {
    Gemini,
    Openai,
}

impl From<ProviderChoice> for ModelProvider {
    fn from(choice: ProviderChoice) -> Self {
        match choice {
            ProviderChoice::Gemini => ModelProvider::Gemini,
            ProviderChoice::Openai => ModelProvider::OpenAiCompatible,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

/// Effective settings after merging flags, config file and defaults
#[derive(Debug)]
struct Settings {
    provider: ModelProvider,
    model: String,
    api_key_env: String,
    base_url: Option<String>,
    temperature: Option<f32>,
    timeout: Duration,
    starting_credits: u32,
    transcripts: bool,
    interview: InterviewConfig,
}

/// Priority: flag > config file > default
fn resolve_settings(cli: &Cli, file: FileConfig) -> Result<Settings> {
    let provider = match (cli.provider, file.model.provider.as_deref()) {
        (Some(choice), _) => choice.into(),
        (None, Some(name)) => ModelProvider::from_str(name)
            .map_err(anyhow::Error::msg)
            .context("Invalid [model].provider")?,
        (None, None) => ModelProvider::Gemini,
    };

    let language = cli
        .language
        .clone()
        .or(file.session.language)
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let language = match find_language(&language) {
        Some(canonical) => canonical.to_string(),
        None => anyhow::bail!("Unsupported language: {}", language),
    };

    let field = |flag: &Option<String>, file_value: Option<String>| {
        flag.clone().or(file_value).unwrap_or_default()
    };
    let interview = InterviewConfig::new(
        field(&cli.name, file.interview.candidate_name),
        field(&cli.company, file.interview.company_name),
        field(&cli.role, file.interview.job_role),
        field(&cli.url, file.interview.company_url),
    )
    .with_language(language);

    Ok(Settings {
        provider,
        model: cli
            .model
            .clone()
            .or(file.model.model)
            .unwrap_or_else(|| provider.default_model().to_string()),
        api_key_env: cli
            .api_key_env
            .clone()
            .or(file.model.api_key_env)
            .unwrap_or_else(|| provider.default_api_key_env().to_string()),
        base_url: cli.base_url.clone().or(file.model.base_url),
        temperature: file.model.temperature,
        timeout: cli
            .timeout_secs
            .or(file.model.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        starting_credits: cli
            .credits
            .or(file.session.starting_credits)
            .unwrap_or(DEFAULT_STARTING_CREDITS),
        transcripts: !cli.no_transcript && file.session.transcripts.unwrap_or(true),
        interview,
    })
}

fn load_file_config(cli: &Cli) -> Result<FileConfig> {
    match cli.config {
        Some(ref path) => FileConfig::load_from(path),
        None => {
            let working_dir =
                std::env::current_dir().context("Failed to get current directory")?;
            Ok(FileConfig::load(&working_dir)?.unwrap_or_default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    init_tracing("warn", log_format);

    let settings = resolve_settings(&cli, load_file_config(&cli)?)?;

    if cli.dry_run {
        render::print_dry_run(&settings);
        return Ok(());
    }

    let api_key = std::env::var(&settings.api_key_env).unwrap_or_default();
    let mut model_config = ModelConfig::new(settings.model.clone(), api_key);
    if let Some(ref base_url) = settings.base_url {
        model_config = model_config.with_base_url(base_url.clone());
    }
    if let Some(temperature) = settings.temperature {
        model_config = model_config.with_temperature(temperature);
    }
    let model = create_model(settings.provider, model_config).with_context(|| {
        format!(
            "Failed to create {} model (is {} set?)",
            settings.provider, settings.api_key_env
        )
    })?;

    let logger = match cli.log_file {
        Some(ref path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let auth_session = SimulatedAuth.sign_in(interactive::choose_sign_in()?).await;
    render::print_signed_in(auth_session.provider);

    let session = InterviewSession::new(
        Arc::from(model),
        Arc::new(logger),
        Arc::new(CreditLedger::new(settings.starting_credits)),
        settings.interview.clone(),
    )
    .with_settings(SessionSettings {
        request_timeout: settings.timeout,
        transcripts: if settings.transcripts {
            TranscriptOutput::DataDir
        } else {
            TranscriptOutput::Disabled
        },
    });

    match JsonProfileStore::new() {
        Ok(store) => {
            let candidate_name = settings.interview.candidate_name.trim();
            if candidate_name.is_empty() {
                session.prefill_from_profile(&store);
            } else {
                session.remember_candidate_name(&store, candidate_name);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Profile store unavailable"),
    }

    interactive::run(&session, &SimulatedPayment, cli.json_output).await
}
