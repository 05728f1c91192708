use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::{GenerationOutput, ResponseSchema};

/// Errors that can occur while talking to a language model
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Request to language model failed: {0}")]
    Transport(reqwest::Error),

    #[error("Language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Language model returned an empty response")]
    EmptyResponse,

    #[error("Structured response did not match schema: {0}")]
    Schema(String),

    #[error("Language model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Language model configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::Schema(format!("malformed JSON: {}", err))
    }
}

/// Configuration for a language model backend
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model identifier sent to the service
    pub model: String,
    /// API key (may be empty for local OpenAI-compatible servers)
    pub api_key: String,
    /// Override for the service base URL
    pub base_url: Option<String>,
    /// Sampling temperature (None = service default)
    pub temperature: Option<f32>,
}

impl ModelConfig {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelProvider {
    Gemini,
    OpenAiCompatible,
}

impl ModelProvider {
    /// Model used when none is configured
    pub fn default_model(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "gemini-2.5-flash",
            ModelProvider::OpenAiCompatible => "gpt-4o-mini",
        }
    }

    /// Environment variable the API key is read from by default
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ModelProvider::Gemini => "GEMINI_API_KEY",
            ModelProvider::OpenAiCompatible => "OPENAI_API_KEY",
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelProvider::Gemini => write!(f, "gemini"),
            ModelProvider::OpenAiCompatible => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" | "google-genai" => Ok(ModelProvider::Gemini),
            "openai" | "openai-compatible" | "ollama" => Ok(ModelProvider::OpenAiCompatible),
            _ => Err(format!("Unknown model provider: {}", s)),
        }
    }
}

/// The interviewer's view of a generative language service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable name of the backend (e.g., "Gemini")
    fn name(&self) -> &str;

    /// Generate free text for a prompt
    async fn generate_text(&self, prompt: &str) -> Result<GenerationOutput<String>, GenerationError>;

    /// Generate a JSON object constrained by `schema`.
    ///
    /// Implementations must validate the returned object against the schema
    /// and fail with [`GenerationError::Schema`] when it does not conform.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<GenerationOutput<Value>, GenerationError>;
}
