use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::report::{parse_report, ReportSection, SectionTitle};

/// Score and narrative produced at the end of an interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackReport {
    /// 0-100 as returned by the model; not clamped
    pub score: i64,
    /// Narrative with bold section titles
    pub report: String,
}

#[derive(Error, Debug)]
pub enum FeedbackParseError {
    #[error("Failed to decode feedback object: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FeedbackReport {
    pub fn new(score: i64, report: impl Into<String>) -> Self {
        Self {
            score,
            report: report.into(),
        }
    }

    /// Decode from the structured reply of the model
    pub fn from_value(value: Value) -> Result<Self, FeedbackParseError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Report split into its titled sections
    pub fn sections(&self) -> Vec<ReportSection> {
        parse_report(&self.report)
    }

    /// Body of a given section, if present
    pub fn section(&self, title: SectionTitle) -> Option<String> {
        self.sections()
            .into_iter()
            .find(|s| s.title == Some(title))
            .map(|s| s.body)
    }

    /// Whether the score falls inside 0..=100
    pub fn score_in_range(&self) -> bool {
        (0..=100).contains(&self.score)
    }
}
