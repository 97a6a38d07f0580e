//! Summary and work-experience generation.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{GENERATION_SYSTEM, SUMMARY_PROMPT, WORK_EXPERIENCE_PROMPT};
use crate::llm_client::prompts::{fill, language_instruction};
use crate::llm_client::LanguageModel;
use crate::models::cv::{Language, WorkExperience};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryRequest {
    pub job_title: String,
    pub skills: Vec<String>,
    pub work_experiences: Vec<WorkExperience>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSummary {
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperienceRequest {
    pub job_title: String,
    pub company: String,
    pub description: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkExperience {
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

fn require(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Field '{field}' wajib diisi.")));
    }
    Ok(())
}

fn experience_lines(experiences: &[WorkExperience]) -> String {
    if experiences.is_empty() {
        return "(none)".to_string();
    }
    experiences
        .iter()
        .map(|w| format!("- {} at {}", w.job_title.trim(), w.company.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn generate_summary(
    llm: &dyn LanguageModel,
    request: &SummaryRequest,
) -> Result<GeneratedSummary, AppError> {
    require(&request.job_title, "jobTitle")?;

    let skills = request
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = fill(
        SUMMARY_PROMPT,
        &[
            ("job_title", request.job_title.trim()),
            ("skills", if skills.is_empty() { "(none)" } else { skills.as_str() }),
            ("experience", &experience_lines(&request.work_experiences)),
            ("language_instruction", language_instruction(request.language)),
        ],
    );

    let generated: GeneratedSummary = llm.call_json(&prompt, GENERATION_SYSTEM).await?;
    let summary = generated.summary.trim().to_string();
    if summary.is_empty() {
        return Err(AppError::MalformedReply("empty summary".to_string()));
    }
    info!("Generated summary for '{}'", request.job_title.trim());
    Ok(GeneratedSummary { summary })
}

pub async fn generate_work_experience(
    llm: &dyn LanguageModel,
    request: &WorkExperienceRequest,
) -> Result<GeneratedWorkExperience, AppError> {
    require(&request.job_title, "jobTitle")?;
    require(&request.company, "company")?;

    let description = match request.description.trim() {
        "" => "(none)",
        d => d,
    };
    let prompt = fill(
        WORK_EXPERIENCE_PROMPT,
        &[
            ("job_title", request.job_title.trim()),
            ("company", request.company.trim()),
            ("description", description),
            ("language_instruction", language_instruction(request.language)),
        ],
    );

    let generated: GeneratedWorkExperience = llm.call_json(&prompt, GENERATION_SYSTEM).await?;
    let achievements: Vec<String> = generated
        .achievements
        .into_iter()
        .map(|a| a.trim().trim_start_matches(['-', '•']).trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    info!(
        "Generated {} achievements for '{}' at '{}'",
        achievements.len(),
        request.job_title.trim(),
        request.company.trim()
    );
    Ok(GeneratedWorkExperience {
        description: generated.description.trim().to_string(),
        achievements,
    })
}
