//! Sectioning of narrative feedback reports.
//!
//! Reports carry bold markdown titles (`**Overall Assessment:**`). The parser
//! looks for bold segments whose text names a known section and splits the
//! report at those points. Other bold text stays inside the surrounding
//! section body.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Titles a feedback report is expected to contain, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTitle {
    OverallAssessment,
    KeyStrengths,
    AreasForImprovement,
}

impl SectionTitle {
    pub const ALL: [SectionTitle; 3] = [
        SectionTitle::OverallAssessment,
        SectionTitle::KeyStrengths,
        SectionTitle::AreasForImprovement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTitle::OverallAssessment => "Overall Assessment",
            SectionTitle::KeyStrengths => "Key Strengths",
            SectionTitle::AreasForImprovement => "Areas for Improvement",
        }
    }

    /// Match the text inside a bold marker, ignoring case and a trailing colon
    pub fn from_marker(marker: &str) -> Option<Self> {
        let cleaned = marker.trim().trim_end_matches(':').trim();
        Self::ALL
            .into_iter()
            .find(|title| title.as_str().eq_ignore_ascii_case(cleaned))
    }
}

impl std::fmt::Display for SectionTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One section of a report. Text before the first recognised title has no title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: Option<SectionTitle>,
    pub body: String,
}

/// A recognised `**Title**` marker located in the source text
struct TitleMarker {
    start: usize,
    end: usize,
    title: SectionTitle,
}

/// Every `**` is tried as an opener, so a stray marker in a body cannot
/// swallow the opening of a later title.
fn title_markers(text: &str) -> Vec<TitleMarker> {
    let mut markers = Vec::new();
    let mut cursor = 0;
    while let Some(open) = text[cursor..].find("**") {
        let open = cursor + open;
        let inner_start = open + 2;
        let Some(close) = text[inner_start..].find("**") else {
            break;
        };
        let close = inner_start + close;
        let inner = &text[inner_start..close];

        match SectionTitle::from_marker(inner).filter(|_| !inner.contains('\n')) {
            Some(title) => {
                markers.push(TitleMarker {
                    start: open,
                    end: close + 2,
                    title,
                });
                cursor = close + 2;
            }
            None => cursor = inner_start,
        }
    }
    markers
}

/// Split a report into sections at recognised bold titles
pub fn parse_report(report: &str) -> Vec<ReportSection> {
    let titles = title_markers(report);

    debug!(
        report_len = report.len(),
        sections = titles.len(),
        "Parsing feedback report"
    );

    let mut sections = Vec::new();

    let preamble_end = titles.first().map(|m| m.start).unwrap_or(report.len());
    let preamble = report[..preamble_end].trim();
    if !preamble.is_empty() {
        sections.push(ReportSection {
            title: None,
            body: preamble.to_string(),
        });
    }

    for (i, marker) in titles.iter().enumerate() {
        let body_end = titles
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(report.len());
        let body = report[marker.end..body_end]
            .trim_start()
            .trim_start_matches(':')
            .trim();
        sections.push(ReportSection {
            title: Some(marker.title),
            body: body.to_string(),
        });
    }

    sections
}
