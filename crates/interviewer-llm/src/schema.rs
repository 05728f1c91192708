//! Response schemas for structured generation.
//!
//! A [`ResponseSchema`] describes a flat JSON object. It is rendered into the
//! provider-specific schema dialect for the request and used afterwards to
//! validate whatever the service returned.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::GenerationError;

/// JSON type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    String,
}

impl FieldType {
    fn json_name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::String => "string",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::String => value.is_string(),
        }
    }
}

/// One property of a structured response
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
}

/// Schema for a flat JSON object response. Every field is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSchema {
    pub fields: Vec<SchemaField>,
}

impl ResponseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn required(mut self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.fields.push(SchemaField {
            name: name.to_string(),
            field_type,
            description: description.to_string(),
        });
        self
    }

    /// Render as standard JSON Schema
    pub fn to_json_schema(&self) -> Value {
        self.render(false)
    }

    /// Render in the Gemini `responseSchema` dialect (upper-case type names)
    pub fn to_gemini_schema(&self) -> Value {
        self.render(true)
    }

    fn render(&self, upper_case: bool) -> Value {
        let type_name = |name: &str| {
            if upper_case {
                name.to_uppercase()
            } else {
                name.to_string()
            }
        };

        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                json!({
                    "type": type_name(field.field_type.json_name()),
                    "description": field.description,
                }),
            );
        }
        let required: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();

        json!({
            "type": type_name("object"),
            "properties": properties,
            "required": required,
        })
    }

    /// Check that `value` is an object carrying every required field with the declared type
    pub fn validate(&self, value: &Value) -> Result<(), GenerationError> {
        let object = value
            .as_object()
            .ok_or_else(|| GenerationError::Schema("expected a JSON object".to_string()))?;

        for field in &self.fields {
            match object.get(&field.name) {
                Some(v) if field.field_type.matches(v) => {}
                Some(v) => {
                    return Err(GenerationError::Schema(format!(
                        "field '{}' should be {} but was {}",
                        field.name,
                        field.field_type.json_name(),
                        v
                    )))
                }
                None => {
                    return Err(GenerationError::Schema(format!(
                        "missing required field '{}'",
                        field.name
                    )))
                }
            }
        }
        Ok(())
    }

    /// Parse a model reply into a JSON object and validate it
    pub fn parse_reply(&self, reply: &str) -> Result<Value, GenerationError> {
        let value = extract_json_object(reply)?;
        self.validate(&value)?;
        Ok(value)
    }
}

/// Extract a JSON object from model text, tolerating code fences and surrounding prose
pub fn extract_json_object(text: &str) -> Result<Value, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            debug!(start, end, "Extracting embedded JSON object");
            Ok(serde_json::from_str(&trimmed[start..=end])?)
        }
        _ => Err(GenerationError::Schema(
            "no JSON object found in response".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score_schema() -> ResponseSchema {
        ResponseSchema::new()
            .required("score", FieldType::Integer, "A score")
            .required("report", FieldType::String, "A report")
    }

    #[test]
    fn test_gemini_schema_uses_upper_case_types() {
        let schema = score_schema().to_gemini_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["score"]["type"], "INTEGER");
        assert_eq!(schema["properties"]["report"]["type"], "STRING");
        assert_eq!(schema["required"], json!(["score", "report"]));
    }

    #[test]
    fn test_json_schema_uses_lower_case_types() {
        let schema = score_schema().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["score"]["type"], "integer");
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let err = score_schema()
            .validate(&json!({"score": 80}))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Schema(msg) if msg.contains("report")));
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let err = score_schema()
            .validate(&json!({"score": "eighty", "report": "ok"}))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Schema(_)));
    }

    #[test]
    fn test_validate_rejects_null_field() {
        let err = score_schema()
            .validate(&json!({"score": 1, "report": null}))
            .unwrap_err();
        assert!(matches!(err, GenerationError::Schema(msg) if msg.contains("report")));
    }

    #[test]
    fn test_parse_reply_strips_code_fence() {
        let reply = "```json\n{\"score\": 72, \"report\": \"Solid\"}\n```";
        let value = score_schema().parse_reply(reply).unwrap();
        assert_eq!(value["score"], 72);
    }

    #[test]
    fn test_parse_reply_rejects_malformed_json() {
        let err = score_schema().parse_reply("{\"score\": 72, ").unwrap_err();
        assert!(matches!(err, GenerationError::Schema(_)));
    }

    #[test]
    fn test_extract_empty_reply() {
        assert!(matches!(
            extract_json_object("   "),
            Err(GenerationError::EmptyResponse)
        ));
    }
}
