mod feedback;
mod language;
mod prompts;
pub mod report;
mod types;

pub use feedback::{FeedbackParseError, FeedbackReport};
pub use language::{find_language, SUPPORTED_LANGUAGES};
pub use prompts::{
    feedback_schema, format_transcript, InterviewPrompts, PromptError, StructuredRequest,
    INTERVIEWER_LABEL,
};
pub use report::{parse_report, ReportSection, SectionTitle};
pub use types::{ChatMessage, ConfigEdit, InterviewConfig, Role, DEFAULT_LANGUAGE};
