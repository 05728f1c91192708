//! # interviewer-llm
//!
//! Language model backends for the interviewer.
//!
//! ## Key Types
//!
//! - [`LanguageModel`] - Text and structured generation
//! - [`ResponseSchema`] - Schema for structured (JSON) responses
//! - [`GenerationError`] - Transport, status, schema and timeout failures

mod gemini;
mod http;
mod openai;
mod output;
mod schema;
mod traits;

pub use gemini::GeminiModel;
pub use http::HttpTransport;
pub use openai::OpenAiCompatibleModel;
pub use output::GenerationOutput;
pub use schema::{extract_json_object, FieldType, ResponseSchema, SchemaField};
pub use traits::{GenerationError, LanguageModel, ModelConfig, ModelProvider};

/// Create a model backend by provider
pub fn create_model(
    provider: ModelProvider,
    config: ModelConfig,
) -> Result<Box<dyn LanguageModel>, GenerationError> {
    match provider {
        ModelProvider::Gemini => Ok(Box::new(GeminiModel::new(config)?)),
        ModelProvider::OpenAiCompatible => Ok(Box::new(OpenAiCompatibleModel::new(config))),
    }
}
