use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use crate::{
    GenerationError, GenerationOutput, HttpTransport, LanguageModel, ModelConfig, ResponseSchema,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Google Gemini `generateContent` backend
pub struct GeminiModel {
    config: ModelConfig,
    transport: HttpTransport,
}

impl GeminiModel {
    pub fn new(config: ModelConfig) -> Result<Self, GenerationError> {
        if config.api_key.is_empty() {
            return Err(GenerationError::Config(
                "Gemini requires an API key".to_string(),
            ));
        }
        Ok(Self {
            config,
            transport: HttpTransport::new(),
        })
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.config.model)
    }

    async fn send(
        &self,
        prompt: &str,
        generation_config: GenerationConfig,
    ) -> Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: Some(generation_config),
        };

        let response: GenerateContentResponse = self
            .transport
            .post_json(
                &self.endpoint(),
                &[("x-goog-api-key", self.config.api_key.as_str())],
                &request,
            )
            .await?;

        response.text().ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate_text(&self, prompt: &str) -> Result<GenerationOutput<String>, GenerationError> {
        let start = Instant::now();
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Generating text"
        );

        let config = GenerationConfig {
            temperature: self.config.temperature,
            ..Default::default()
        };
        let text = self.send(prompt, config).await?;

        Ok(GenerationOutput::new(text, start.elapsed()))
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &ResponseSchema,
    ) -> Result<GenerationOutput<Value>, GenerationError> {
        let start = Instant::now();
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            fields = schema.fields.len(),
            "Generating structured response"
        );

        let config = GenerationConfig {
            temperature: self.config.temperature,
            response_mime_type: Some("application/json"),
            response_schema: Some(schema.to_gemini_schema()),
        };
        let text = self.send(prompt, config).await?;
        let value = schema.parse_reply(&text)?;

        Ok(GenerationOutput::new(value, start.elapsed()))
    }
}
