//! Configuration file support for the interviewer.
//!
//! Loads configuration from `interviewer.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// The config file name
pub const CONFIG_FILE_NAME: &str = "interviewer.toml";

/// Configuration loaded from `interviewer.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub interview: InterviewSection,
}

/// Language model backend
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// "gemini" or "openai"
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    pub starting_credits: Option<u32>,
    pub language: Option<String>,
    /// Record transcripts under the data directory (default: true)
    pub transcripts: Option<bool>,
}

/// Prefilled interview fields
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct InterviewSection {
    pub candidate_name: Option<String>,
    pub company_name: Option<String>,
    pub job_role: Option<String>,
    pub company_url: Option<String>,
}

impl FileConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_from(&config_path).map(Some)
    }

    /// Load an explicit config file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
