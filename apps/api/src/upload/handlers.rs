use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::signer::{is_allowed_type, sanitize_file_name, upload_key, UPLOAD_URL_EXPIRY_SECS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub upload_url: String,
    pub key: String,
    pub expires_in: u64,
}

/// POST /api/upload
///
/// Issues a pre-signed PUT URL under the caller's upload prefix.
pub async fn handle_create_upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<UploadRequest>, AppError>,
) -> Result<Json<UploadResponse>, AppError> {
    if !is_allowed_type(&req.content_type) {
        return Err(AppError::UnsupportedMediaType(format!(
            "Tipe file '{}' tidak didukung.",
            req.content_type
        )));
    }
    let file_name = sanitize_file_name(&req.file_name)
        .ok_or_else(|| AppError::Validation("Nama file tidak valid.".to_string()))?;

    let key = upload_key(&user.uid, &file_name);
    let upload_url = state.uploads.presign_put(&key, &req.content_type).await?;

    Ok(Json(UploadResponse {
        upload_url,
        key,
        expires_in: UPLOAD_URL_EXPIRY_SECS,
    }))
}
