use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Which interview event a model call serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Opening,
    FollowUp,
    Feedback,
}

impl GenerationStage {
    fn label(&self) -> &'static str {
        match self {
            GenerationStage::Opening => "opening",
            GenerationStage::FollowUp => "follow-up",
            GenerationStage::Feedback => "feedback",
        }
    }
}

/// Structured log events for an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    SessionStarted {
        candidate: String,
        company: String,
        role: String,
        language: String,
        credits_remaining: u32,
    },
    GenerationStarted {
        stage: GenerationStage,
        prompt_preview: String,
    },
    GenerationCompleted {
        stage: GenerationStage,
        duration_secs: f64,
        chars: usize,
    },
    GenerationFailed {
        stage: GenerationStage,
        error: String,
    },
    CandidateAnswered {
        turn: usize,
        chars: usize,
    },
    FeedbackReady {
        score: i64,
        sections: usize,
    },
    SessionReset {
        candidate: String,
    },
    CreditsAdded {
        amount: u32,
        balance: u32,
    },
    IntentRejected {
        intent: String,
        reason: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for interview events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    quiet: bool,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            quiet: false,
            file_writer: None,
        }
    }

    /// Logger that writes nothing to the console
    pub fn silent() -> Self {
        Self {
            format: LogFormat::Compact,
            quiet: true,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            quiet: false,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        if self.quiet {
            return;
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::SessionStarted {
                candidate,
                company,
                role,
                language,
                credits_remaining,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Candidate:".dimmed(),
                    Self::truncate_with_padding(candidate, 54, 57)
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Position: ".dimmed(),
                    Self::truncate_with_padding(&format!("{} at {}", role, company), 54, 57)
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Language: ".dimmed(),
                    Self::truncate_with_padding(language, 54, 57)
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "  {} {} credit{} left",
                    "●".dimmed(),
                    credits_remaining,
                    if *credits_remaining == 1 { "" } else { "s" }
                );
                let _ = writeln!(stderr);
            }
            LogEvent::GenerationStarted { stage, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "▶".bright_magenta(),
                    format!("Interviewer is preparing the {}...", stage.label()).dimmed()
                );
            }
            LogEvent::GenerationCompleted { duration_secs, .. } => {
                let _ = writeln!(
                    stderr,
                    "    {} Done ({:.1}s)",
                    "✓".bright_green(),
                    duration_secs
                );
            }
            LogEvent::GenerationFailed { stage, error } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} failed: {}",
                    "✗".bright_red(),
                    stage.label(),
                    error.bright_red()
                );
            }
            LogEvent::FeedbackReady { score, .. } => {
                let _ = writeln!(
                    stderr,
                    "  {} {}",
                    "✓".bright_green(),
                    format!("Feedback ready: {}/100", score).bright_green()
                );
            }
            LogEvent::SessionReset { .. } => {
                let _ = writeln!(stderr, "  {} {}", "↺".bright_cyan(), "Session reset".dimmed());
            }
            LogEvent::CreditsAdded { amount, balance } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} credits added (balance: {})",
                    "+".bright_green(),
                    amount,
                    balance
                );
            }
            LogEvent::IntentRejected { intent, reason } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} rejected: {}",
                    "⚠".bright_yellow(),
                    intent,
                    reason.bright_yellow()
                );
            }
            LogEvent::CandidateAnswered { .. } => {
                // Transcript rendering already shows the answer
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::SessionStarted {
                company,
                role,
                credits_remaining,
                ..
            } => format!(
                "[{}] session:start {} @ {} credits={}",
                timestamp, role, company, credits_remaining
            ),
            LogEvent::GenerationStarted { stage, .. } => {
                format!("[{}] gen:start:{}", timestamp, stage.label())
            }
            LogEvent::GenerationCompleted {
                stage,
                duration_secs,
                chars,
            } => format!(
                "[{}] gen:done:{} {}c {:.1}s",
                timestamp,
                stage.label(),
                chars,
                duration_secs
            ),
            LogEvent::GenerationFailed { stage, error } => {
                format!("[{}] gen:fail:{} {}", timestamp, stage.label(), error)
            }
            LogEvent::CandidateAnswered { turn, chars } => {
                format!("[{}] answer:{} {}c", timestamp, turn, chars)
            }
            LogEvent::FeedbackReady { score, sections } => {
                format!("[{}] feedback score={} sections={}", timestamp, score, sections)
            }
            LogEvent::SessionReset { .. } => format!("[{}] session:reset", timestamp),
            LogEvent::CreditsAdded { amount, balance } => {
                format!("[{}] credits:+{} balance={}", timestamp, amount, balance)
            }
            LogEvent::IntentRejected { intent, reason } => {
                format!("[{}] rejected:{} {}", timestamp, intent, reason)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = if s.chars().count() > max_len {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        } else {
            s.to_string()
        };

        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1);
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
