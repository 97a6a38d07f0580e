//! Axum route handlers for the generation API.

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::generation::generator::{
    generate_summary, generate_work_experience, GeneratedSummary, GeneratedWorkExperience,
    SummaryRequest, WorkExperienceRequest,
};
use crate::state::AppState;

/// POST /api/generate/summary
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<SummaryRequest>, AppError>,
) -> Result<Json<GeneratedSummary>, AppError> {
    let generated = generate_summary(state.llm.as_ref(), &request).await?;
    Ok(Json(generated))
}

/// POST /api/generate/work-experience
pub async fn handle_generate_work_experience(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<WorkExperienceRequest>, AppError>,
) -> Result<Json<GeneratedWorkExperience>, AppError> {
    let generated = generate_work_experience(state.llm.as_ref(), &request).await?;
    Ok(Json(generated))
}
