use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::debug;

use crate::{
    GenerationError, GenerationOutput, HttpTransport, LanguageModel, ModelConfig, ResponseSchema,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Any OpenAI-compatible chat-completions API (OpenAI, Ollama, vLLM, etc.)
pub struct OpenAiCompatibleModel {
    config: ModelConfig,
    transport: HttpTransport,
}

impl OpenAiCompatibleModel {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            transport: HttpTransport::new(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    async fn send(
        &self,
        prompt: String,
        response_format: Option<Value>,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: self.config.temperature,
            response_format,
        };

        let auth = format!("Bearer {}", self.config.api_key);
        let headers: Vec<(&str, &str)> = if self.config.api_key.is_empty() {
            Vec::new()
        } else {
            vec![("Authorization", auth.as_str())]
        };

        let response: ChatResponse = self
            .transport
            .post_json(&self.endpoint(), &headers, &request)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatibleModel {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    async fn generate_text(&self, prompt: &str) -> Result<GenerationOutput<String>, GenerationError> {
        let start = Instant::now();
        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Generating text"
        );

        let text = self.send(prompt.to_string(), None).await?;
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

        // json_object mode does not take a schema, so it travels in the prompt
        let prompt = format!(
            "{}\n\nRespond with a single JSON object matching this JSON Schema:\n{}",
            prompt,
            schema.to_json_schema()
        );
        let text = self
            .send(prompt, Some(json!({ "type": "json_object" })))
            .await?;
        let value = schema.parse_reply(&text)?;

        Ok(GenerationOutput::new(value, start.elapsed()))
    }
}
