use interviewer_llm::{FieldType, ResponseSchema};
use thiserror::Error;

use crate::{ChatMessage, InterviewConfig, Role};

/// Label used for the AI side of the transcript
pub const INTERVIEWER_LABEL: &str = "Interviewer";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("Cannot build a follow-up prompt from an empty transcript")]
    EmptyTranscript,

    #[error("The last transcript turn is not a candidate answer")]
    NoCandidateAnswer,
}

/// A prompt plus the schema the reply must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub prompt: String,
    pub schema: ResponseSchema,
}

/// Prompt templates for the three interview events
pub struct InterviewPrompts;

impl InterviewPrompts {
    /// Build the prompt that opens the interview with a greeting and one question
    pub fn build_opening_prompt(config: &InterviewConfig) -> String {
        format!(
            r#"You are a senior hiring manager at {company}, interviewing a candidate for the {role} position.

## Company
Study the company's website to pick up its tone, terminology and priorities: {url}
Adopt a communication style that reflects that professional environment and use company-specific language in your questions.

## Your Task
Open the interview. Welcome the candidate, {candidate}, by name and ask your first question about their fit for the role.

## Rules
- Your response must contain ONLY the welcome and exactly one question.
- Do not add notes, explanations or commentary about what you are doing.
- Respond entirely in {language}."#,
            company = config.company_name,
            role = config.job_role,
            url = config.company_url,
            candidate = config.candidate_name,
            language = config.language,
        )
    }

    /// Build the prompt asking for a follow-up to the candidate's latest answer.
    ///
    /// The transcript must end with the candidate's turn.
    pub fn build_follow_up_prompt(
        config: &InterviewConfig,
        transcript: &[ChatMessage],
    ) -> Result<String, PromptError> {
        let (last, earlier) = transcript
            .split_last()
            .ok_or(PromptError::EmptyTranscript)?;
        if last.role != Role::User || last.content.trim().is_empty() {
            return Err(PromptError::NoCandidateAnswer);
        }

        Ok(format!(
            r#"You are a hiring manager at {company}, in the middle of an interview with a candidate named {candidate}. The company's culture and values can be learned from {url}.

## Conversation So Far
{history}

## Latest Answer
{candidate}'s last answer was: "{answer}"

## Your Task
Ask ONE follow-up question that goes deeper into the candidate's experience or perspective, based on that last answer.
- Refer directly to what they said.
- Keep the question aligned with the company's culture and values.
- Keep the tone professional and engaging.

Your response must contain ONLY the follow-up question. Respond entirely in {language}."#,
            company = config.company_name,
            candidate = config.candidate_name,
            url = config.company_url,
            history = format_transcript(earlier, &config.candidate_name),
            answer = last.content,
            language = config.language,
        ))
    }

    /// Build the structured request for the final score and narrative report
    pub fn build_feedback_prompt(
        config: &InterviewConfig,
        transcript: &[ChatMessage],
    ) -> StructuredRequest {
        let prompt = format!(
            r#"The interview for the {role} role with candidate {candidate} is now complete. Evaluate the candidate's performance using the full transcript below.

## Conversation Transcript
---
{transcript}
---

## Required Response Format

Respond with a JSON object containing:
- "score": an integer from 0 to 100 evaluating the candidate's performance
- "report": a professional narrative feedback report (string)

The report must use exactly these three sections, each introduced by a bold markdown title:

**Overall Assessment:** A balanced summary of {candidate}'s overall performance and fit for the role.
**Key Strengths:** Specific moments or answers that showed insight, relevance or strong communication. Reference {candidate}'s actual responses.
**Areas for Improvement:** Respectful, constructive suggestions for {candidate}. Point out vague answers, missed opportunities or lack of detail, and recommend methods such as the STAR framework or including measurable results.

The entire report, including the section titles, must be written in {language}."#,
            role = config.job_role,
            candidate = config.candidate_name,
            transcript = format_transcript(transcript, &config.candidate_name),
            language = config.language,
        );

        StructuredRequest {
            prompt,
            schema: feedback_schema(),
        }
    }
}

/// Schema every feedback reply must satisfy
pub fn feedback_schema() -> ResponseSchema {
    ResponseSchema::new()
        .required(
            "score",
            FieldType::Integer,
            "A score from 0 to 100 evaluating the candidate's performance.",
        )
        .required(
            "report",
            FieldType::String,
            "The narrative feedback report, using markdown bold titles (e.g., **Overall Assessment**).",
        )
}

/// Render transcript turns as `Speaker: text` blocks
pub fn format_transcript(transcript: &[ChatMessage], candidate_name: &str) -> String {
    transcript
        .iter()
        .map(|msg| {
            let speaker = match msg.role {
                Role::Model => INTERVIEWER_LABEL,
                Role::User => candidate_name,
            };
            format!("{}: {}", speaker, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
