use serde::{Deserialize, Serialize};

/// Language used when none has been chosen
pub const DEFAULT_LANGUAGE: &str = "English";

/// What the candidate is interviewing for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfig {
    pub candidate_name: String,
    pub company_name: String,
    pub job_role: String,
    pub company_url: String,
    pub language: String,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            candidate_name: String::new(),
            company_name: String::new(),
            job_role: String::new(),
            company_url: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// A single-field change to an [`InterviewConfig`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ConfigEdit {
    CandidateName(String),
    CompanyName(String),
    JobRole(String),
    CompanyUrl(String),
    Language(String),
}

impl InterviewConfig {
    pub fn new(
        candidate_name: impl Into<String>,
        company_name: impl Into<String>,
        job_role: impl Into<String>,
        company_url: impl Into<String>,
    ) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            company_name: company_name.into(),
            job_role: job_role.into(),
            company_url: company_url.into(),
            ..Default::default()
        }
    }

    pub fn with_candidate_name(self, candidate_name: impl Into<String>) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            ..self
        }
    }

    pub fn with_company_name(self, company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            ..self
        }
    }

    pub fn with_job_role(self, job_role: impl Into<String>) -> Self {
        Self {
            job_role: job_role.into(),
            ..self
        }
    }

    pub fn with_company_url(self, company_url: impl Into<String>) -> Self {
        Self {
            company_url: company_url.into(),
            ..self
        }
    }

    pub fn with_language(self, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..self
        }
    }

    /// Apply an edit, leaving every other field unchanged
    pub fn apply(self, edit: ConfigEdit) -> Self {
        match edit {
            ConfigEdit::CandidateName(v) => self.with_candidate_name(v),
            ConfigEdit::CompanyName(v) => self.with_company_name(v),
            ConfigEdit::JobRole(v) => self.with_job_role(v),
            ConfigEdit::CompanyUrl(v) => self.with_company_url(v),
            ConfigEdit::Language(v) => self.with_language(v),
        }
    }

    /// Defaults for a fresh session; only the candidate name carries over
    pub fn reset(&self) -> Self {
        Self::default().with_candidate_name(self.candidate_name.clone())
    }

    /// Names of required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("candidate name", &self.candidate_name),
            ("company name", &self.company_name),
            ("job role", &self.job_role),
            ("company URL", &self.company_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The candidate
    User,
    /// The AI interviewer
    Model,
}

/// One turn of the interview transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
