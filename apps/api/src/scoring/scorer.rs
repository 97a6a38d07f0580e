//! Scoring pipeline: render or extract text, one model call, validate.

use serde_json::Value;
use tracing::info;

use crate::cv::render_text::render_plain_text;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill, language_instruction};
use crate::llm_client::LanguageModel;
use crate::models::cv::{CvContent, Language};
use crate::scoring::prompts::{SCORE_PROMPT, SCORE_SYSTEM};
use crate::scoring::report::{validate_reply, ScoreOutcome, ScoreReport, SectionStatus};

/// Highest score a section with no content may receive.
pub const MISSING_SECTION_MAX_SCORE: u8 = 20;

/// Scores résumé text with a single model call.
pub async fn score_text(
    llm: &dyn LanguageModel,
    cv_text: &str,
    language: Language,
) -> Result<ScoreOutcome, AppError> {
    let prompt = fill(
        SCORE_PROMPT,
        &[
            ("cv_text", cv_text),
            ("language_instruction", language_instruction(language)),
        ],
    );
    let reply: Value = llm.call_json(&prompt, SCORE_SYSTEM).await?;
    let outcome = validate_reply(reply)?;

    match &outcome {
        ScoreOutcome::Report(report) => info!("Scored CV: overall {}", report.overall_score),
        ScoreOutcome::NotCv { .. } => info!("Model judged the document not to be a CV"),
    }
    Ok(outcome)
}

/// Scores structured builder content. Sections without data are capped
/// regardless of what the model returned.
pub async fn score_cv(llm: &dyn LanguageModel, cv: &CvContent) -> Result<ScoreOutcome, AppError> {
    let text = render_plain_text(cv);
    let mut outcome = score_text(llm, &text, cv.language).await?;
    if let ScoreOutcome::Report(report) = &mut outcome {
        apply_missing_section_policy(report, cv);
    }
    Ok(outcome)
}

fn section_is_empty(name: &str, cv: &CvContent) -> bool {
    match name {
        "summary" => cv.summary.trim().is_empty(),
        "work_experience" => cv.work_experiences.is_empty(),
        "education" => cv.educations.is_empty(),
        "skills" => cv.skills.iter().all(|s| s.trim().is_empty()),
        _ => false,
    }
}

fn missing_feedback(name: &str, language: Language) -> &'static str {
    match (name, language) {
        ("summary", Language::Id) => "Tambahkan ringkasan profil singkat.",
        ("work_experience", Language::Id) => "Tambahkan minimal satu pengalaman kerja.",
        ("education", Language::Id) => "Tambahkan riwayat pendidikan.",
        ("skills", Language::Id) => "Tambahkan keahlian yang relevan.",
        ("summary", Language::En) => "Add a short profile summary.",
        ("work_experience", Language::En) => "Add at least one work experience.",
        ("education", Language::En) => "Add your education history.",
        (_, Language::En) => "Add relevant skills.",
        (_, Language::Id) => "Lengkapi bagian ini.",
    }
}

pub fn apply_missing_section_policy(report: &mut ScoreReport, cv: &CvContent) {
    for section in &mut report.sections {
        if !section_is_empty(&section.name, cv) {
            continue;
        }
        section.score = section.score.min(MISSING_SECTION_MAX_SCORE);
        section.status = SectionStatus::Poor;
        if section.feedback.is_empty() {
            section.feedback = missing_feedback(&section.name, cv.language).to_string();
        }
    }
}
