use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Represents each line type in the transcript JSONL file.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptLine {
    SessionStart {
        timestamp: DateTime<Utc>,
        session_id: String,
        candidate_name: String,
        company_name: String,
        job_role: String,
        company_url: String,
        language: String,
        model: String,
    },
    Turn {
        turn_number: usize,
        role: String,
        content: String,
        timestamp: DateTime<Utc>,
    },
    SessionEnd {
        outcome: String,
        turns: usize,
        score: Option<i64>,
        duration_secs: f64,
        timestamp: DateTime<Utc>,
    },
}

/// Fields written on the first line of a transcript
#[derive(Debug, Clone, Copy)]
pub struct TranscriptHeader<'a> {
    pub session_id: &'a str,
    pub candidate_name: &'a str,
    pub company_name: &'a str,
    pub job_role: &'a str,
    pub company_url: &'a str,
    pub language: &'a str,
    pub model: &'a str,
}

/// Writes interview transcripts as JSONL to ~/.local/share/interviewer/sessions/.
pub struct TranscriptWriter {
    file: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl TranscriptWriter {
    /// Create a writer in the default sessions directory. The file name is the
    /// current UTC timestamp plus a short hash of the interview target.
    pub fn new(company_name: &str, job_role: &str) -> io::Result<Self> {
        Self::in_dir(&Self::sessions_dir()?, company_name, job_role)
    }

    /// Create a writer in an explicit directory
    pub fn in_dir(dir: &Path, company_name: &str, job_role: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let now = Utc::now();
        let timestamp_str = now.format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string();

        let mut hasher = Sha256::new();
        hasher.update(company_name.as_bytes());
        hasher.update(b"\0");
        hasher.update(job_role.as_bytes());
        let hash = hex::encode(hasher.finalize());
        let short_hash = &hash[..6];

        let filename = format!("{}_{}.jsonl", timestamp_str, short_hash);
        let path = dir.join(filename);

        let file = File::create(&path)?;
        let writer = BufWriter::new(file);

        Ok(Self {
            file: Mutex::new(writer),
            path,
        })
    }

    /// Returns the path to the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_start(&self, header: TranscriptHeader<'_>) {
        let line = TranscriptLine::SessionStart {
            timestamp: Utc::now(),
            session_id: header.session_id.to_string(),
            candidate_name: header.candidate_name.to_string(),
            company_name: header.company_name.to_string(),
            job_role: header.job_role.to_string(),
            company_url: header.company_url.to_string(),
            language: header.language.to_string(),
            model: header.model.to_string(),
        };
        self.write_line(&line);
    }

    pub fn write_turn(&self, turn_number: usize, role: &str, content: &str) {
        let line = TranscriptLine::Turn {
            turn_number,
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        self.write_line(&line);
    }

    pub fn write_end(&self, outcome: &str, turns: usize, score: Option<i64>, duration_secs: f64) {
        let line = TranscriptLine::SessionEnd {
            outcome: outcome.to_string(),
            turns,
            score,
            duration_secs,
            timestamp: Utc::now(),
        };
        self.write_line(&line);
    }

    fn write_line(&self, line: &TranscriptLine) {
        if let Ok(json) = serde_json::to_string(line) {
            if let Ok(mut writer) = self.file.lock() {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
    }

    fn sessions_dir() -> io::Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine data directory",
            )
        })?;
        Ok(data_dir.join("interviewer").join("sessions"))
    }
}
