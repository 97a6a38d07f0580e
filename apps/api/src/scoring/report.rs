//! Score report types and validation of the model's JSON reply.
//!
//! The shape is requested through the prompt but checked here. A reply that
//! parses as JSON but breaks the contract yields a `ReportError`, never a
//! partially filled report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Section keys every report on a résumé must contain, in display order.
pub const REQUIRED_SECTIONS: [&str; 4] = ["summary", "work_experience", "education", "skills"];

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
}

impl SectionStatus {
    fn parse(raw: &str) -> Option<Self> {
        match normalize_key(raw).as_str() {
            "excellent" => Some(SectionStatus::Excellent),
            "good" => Some(SectionStatus::Good),
            "needs_improvement" => Some(SectionStatus::NeedsImprovement),
            "poor" => Some(SectionStatus::Poor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScore {
    pub name: String,
    pub score: u8,
    pub status: SectionStatus,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub overall_score: u8,
    pub ats_compatibility: u8,
    pub keyword_match: u8,
    pub readability: u8,
    pub sections: Vec<SectionScore>,
    pub suggestions: Vec<String>,
}

/// Result of a validated model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Report(ScoreReport),
    /// The model judged the input not to be a résumé.
    NotCv { message: String },
}

/// Wire shape returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub is_cv: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub report: Option<ScoreReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ScoreOutcome> for ScoreResponse {
    fn from(outcome: ScoreOutcome) -> Self {
        match outcome {
            ScoreOutcome::Report(report) => ScoreResponse {
                is_cv: true,
                report: Some(report),
                message: None,
            },
            ScoreOutcome::NotCv { message } => ScoreResponse {
                is_cv: false,
                report: None,
                message: Some(message),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("reply does not match the report shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("reply is missing '{0}'")]
    MissingField(&'static str),

    #[error("'{field}' = {value} is outside 0..=100")]
    ScoreOutOfRange { field: String, value: i64 },

    #[error("unknown section status '{0}'")]
    UnknownStatus(String),

    #[error("section '{0}' is missing")]
    MissingSection(&'static str),

    #[error("unexpected section '{0}'")]
    UnexpectedSection(String),

    #[error("section '{0}' appears more than once")]
    DuplicateSection(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReply {
    is_cv: Option<bool>,
    message: Option<String>,
    overall_score: Option<i64>,
    ats_compatibility: Option<i64>,
    keyword_match: Option<i64>,
    readability: Option<i64>,
    #[serde(default)]
    sections: Vec<RawSection>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    name: Option<String>,
    score: Option<i64>,
    status: Option<String>,
    #[serde(default)]
    feedback: String,
}

fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

fn score(field: &str, value: Option<i64>, name: &'static str) -> Result<u8, ReportError> {
    let value = value.ok_or(ReportError::MissingField(name))?;
    if !(0..=i64::from(MAX_SCORE)).contains(&value) {
        return Err(ReportError::ScoreOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(value as u8)
}

/// Validates a raw model reply into a typed outcome.
pub fn validate_reply(value: Value) -> Result<ScoreOutcome, ReportError> {
    let raw: RawReply = serde_json::from_value(value)?;

    match raw.is_cv {
        None => return Err(ReportError::MissingField("isCv")),
        Some(false) => {
            return Ok(ScoreOutcome::NotCv {
                message: raw
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Dokumen yang diunggah bukan CV.".to_string()),
            })
        }
        Some(true) => {}
    }

    let mut sections: Vec<Option<SectionScore>> = vec![None; REQUIRED_SECTIONS.len()];
    for raw_section in raw.sections {
        let name = raw_section
            .name
            .as_deref()
            .map(normalize_key)
            .ok_or(ReportError::MissingField("sections[].name"))?;
        let slot = REQUIRED_SECTIONS
            .iter()
            .position(|s| *s == name)
            .ok_or_else(|| ReportError::UnexpectedSection(name.clone()))?;
        if sections[slot].is_some() {
            return Err(ReportError::DuplicateSection(name));
        }
        let status_raw = raw_section
            .status
            .ok_or(ReportError::MissingField("sections[].status"))?;
        let status = SectionStatus::parse(&status_raw)
            .ok_or(ReportError::UnknownStatus(status_raw))?;
        sections[slot] = Some(SectionScore {
            score: score(&format!("sections.{name}.score"), raw_section.score, "sections[].score")?,
            name,
            status,
            feedback: raw_section.feedback.trim().to_string(),
        });
    }

    let sections = sections
        .into_iter()
        .zip(REQUIRED_SECTIONS)
        .map(|(section, name)| section.ok_or(ReportError::MissingSection(name)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ScoreOutcome::Report(ScoreReport {
        overall_score: score("overallScore", raw.overall_score, "overallScore")?,
        ats_compatibility: score("atsCompatibility", raw.ats_compatibility, "atsCompatibility")?,
        keyword_match: score("keywordMatch", raw.keyword_match, "keywordMatch")?,
        readability: score("readability", raw.readability, "readability")?,
        sections,
        suggestions: raw
            .suggestions
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    }))
}
