//! Axum route handlers for stored résumés.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::cv::access::{delete_cv, load_owned, load_readable};
use crate::cv::builder::{save_cv, SaveOutcome, SaveRequest};
use crate::cv::export::{download_filename, export, ExportFormat};
use crate::errors::AppError;
use crate::models::cv::{CvRecord, CvRevision, CvStatus, CvSummary, Visibility};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub visibility: Visibility,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub id: Uuid,
    #[serde(default)]
    pub format: ExportFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/cv
///
/// Saves the builder state as a completed résumé.
pub async fn handle_save(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<SaveRequest>, AppError>,
) -> Result<Json<SaveOutcome>, AppError> {
    let outcome = save_cv(state.store.as_ref(), &user, req.id, CvStatus::Completed, req.cv).await?;
    Ok(Json(outcome))
}

/// POST /api/cv/draft
pub async fn handle_save_draft(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<SaveRequest>, AppError>,
) -> Result<Json<SaveOutcome>, AppError> {
    let outcome = save_cv(state.store.as_ref(), &user, req.id, CvStatus::Draft, req.cv).await?;
    Ok(Json(outcome))
}

/// GET /api/cv
///
/// The caller's résumés, most recently updated first.
pub async fn handle_list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CvSummary>>, AppError> {
    let cvs = state
        .store
        .list_by_owner(&user.uid)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(cvs))
}

/// GET /api/cv/:id
pub async fn handle_get(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<CvRecord>, AppError> {
    let cv = load_readable(state.store.as_ref(), id, caller.as_ref()).await?;
    Ok(Json(cv))
}

/// DELETE /api/cv/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<StatusCode, AppError> {
    delete_cv(state.store.as_ref(), id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cv/:id/history
pub async fn handle_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Vec<CvRevision>>, AppError> {
    load_owned(state.store.as_ref(), id, &user).await?;
    let revisions = state.store.revisions(id).await.map_err(AppError::Internal)?;
    Ok(Json(revisions))
}

/// PATCH /api/cv/:id/visibility
pub async fn handle_set_visibility(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<VisibilityRequest>, AppError>,
) -> Result<StatusCode, AppError> {
    load_owned(state.store.as_ref(), id, &user).await?;
    let updated = state
        .store
        .set_visibility(id, req.visibility)
        .await
        .map_err(AppError::Storage)?;
    if !updated {
        return Err(AppError::NotFound(format!("CV {id} tidak ditemukan")));
    }
    tracing::info!("cv {id} visibility set to {}", req.visibility.as_str());
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/cv/download?id=...&format=pdf|docx
pub async fn handle_download(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    WithRejection(Query(query), _): WithRejection<Query<DownloadQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let cv = load_readable(state.store.as_ref(), query.id, caller.as_ref()).await?;
    let bytes = export(&cv.content, query.format)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_filename(&cv.content, query.format)
    );
    Ok((
        [
            (header::CONTENT_TYPE, query.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
