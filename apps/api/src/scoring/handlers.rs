//! Axum route handlers for résumé scoring.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{AuthUser, MaybeAuthUser};
use crate::cv::access::load_readable;
use crate::errors::AppError;
use crate::models::cv::{CvContent, Language};
use crate::scoring::extract::{extract_text, DocumentKind, MAX_FILE_BYTES};
use crate::scoring::report::ScoreResponse;
use crate::scoring::scorer::{score_cv, score_text};
use crate::state::AppState;

/// Multipart framing overhead allowed on top of the file limit.
pub const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

const UNSUPPORTED_FILE_MESSAGE: &str = "Format file tidak didukung. Unggah file PDF atau DOCX.";
const FILE_TOO_LARGE_MESSAGE: &str = "Ukuran file melebihi batas 5 MB.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub cv_id: Uuid,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(FILE_TOO_LARGE_MESSAGE.to_string())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// POST /api/score-file
///
/// Multipart fields: `file` (PDF or DOCX) and optional `language`.
/// The content type is checked before the file body is read.
pub async fn handle_score_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let mut file: Option<(DocumentKind, Bytes)> = None;
    let mut language = Language::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let kind = DocumentKind::from_mime(&content_type).ok_or_else(|| {
                    warn!("Rejected upload with content type '{content_type}'");
                    AppError::UnsupportedMediaType(UNSUPPORTED_FILE_MESSAGE.to_string())
                })?;
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > MAX_FILE_BYTES {
                    return Err(AppError::PayloadTooLarge(FILE_TOO_LARGE_MESSAGE.to_string()));
                }
                file = Some((kind, data));
            }
            "language" => {
                let raw = field.text().await.map_err(multipart_error)?;
                language = Language::parse(raw.trim()).unwrap_or_default();
            }
            _ => {}
        }
    }

    let (kind, data) =
        file.ok_or_else(|| AppError::Validation("Field 'file' wajib diisi.".to_string()))?;
    info!("Scoring {kind:?} upload of {} bytes for user {}", data.len(), user.uid);

    // pdf-extract panics on some malformed inputs; treat that as an unreadable file.
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &data))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::Validation("File tidak dapat dibaca.".to_string())
            } else {
                AppError::Internal(e.into())
            }
        })??;

    let outcome = score_text(state.llm.as_ref(), &text, language).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/score-builder
///
/// Scores unsaved builder content.
pub async fn handle_score_builder(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    WithRejection(Json(cv), _): WithRejection<Json<CvContent>, AppError>,
) -> Result<Json<ScoreResponse>, AppError> {
    let outcome = score_cv(state.llm.as_ref(), &cv).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/cv/analyze
///
/// Scores a stored résumé under the read policy.
pub async fn handle_analyze(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    WithRejection(Json(req), _): WithRejection<Json<AnalyzeRequest>, AppError>,
) -> Result<Json<ScoreResponse>, AppError> {
    let cv = load_readable(state.store.as_ref(), req.cv_id, caller.as_ref()).await?;
    let outcome = score_cv(state.llm.as_ref(), &cv.content).await?;
    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::cv::store::CvStore;
    use crate::models::cv::Visibility;
    use crate::scoring::extract::PDF_MIME;
    use crate::test_support::{
        body_json, sample_report_json, stored_cv, test_app, test_app_with_model, ScriptedModel,
    };

    const BOUNDARY: &str = "cvjitu-test-boundary";

    fn multipart_request(cookie: &str, content_type: &str, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cv\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(
            format!(
                "\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\nen\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/score-file")
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_post(uri: &str, cookie: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn ana_builder_body() -> serde_json::Value {
        json!({
            "firstName": "Ana",
            "lastName": "Putri",
            "jobTitle": "Backend Engineer",
            "workExperiences": [],
            "educations": [],
            "skills": ["Go"],
            "summary": ""
        })
    }

    #[tokio::test]
    async fn test_image_upload_rejected_without_model_call() {
        let app = test_app();
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .clone()
            .oneshot(multipart_request(&cookie, "image/png", b"\x89PNG\r\n\x1a\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_bad_request() {
        let app = test_app();
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .clone()
            .oneshot(multipart_request(&cookie, PDF_MIME, b"not really a pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_score_file_requires_session() {
        let app = test_app();
        let mut request = multipart_request("", PDF_MIME, b"%PDF");
        request.headers_mut().remove(header::COOKIE);
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_builder_scoring_caps_missing_sections() {
        let app = test_app();
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .clone()
            .oneshot(json_post("/api/score-builder", Some(&cookie), ana_builder_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["isCv"], true);
        let sections = body["sections"].as_array().unwrap();
        assert_eq!(sections.len(), 4);
        for section in sections {
            if section["name"] == "work_experience" || section["name"] == "education" {
                assert!(section["score"].as_u64().unwrap() <= 20);
                assert_eq!(section["status"], "poor");
            }
        }
        assert_eq!(app.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_not_cv_reply_passes_through() {
        let model = ScriptedModel::replying(r#"{"isCv": false, "message": "Bukan CV."}"#);
        let app = test_app_with_model(model);
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .oneshot(json_post("/api/score-builder", Some(&cookie), ana_builder_body()))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body, json!({"isCv": false, "message": "Bukan CV."}));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_analysis_failure() {
        let mut reply = sample_report_json();
        reply["sections"].as_array_mut().unwrap().truncate(2);
        let app = test_app_with_model(ScriptedModel::replying(&reply.to_string()));
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .oneshot(json_post("/api/score-builder", Some(&cookie), ana_builder_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "ANALYSIS_FAILED");
        assert_eq!(
            body["error"]["message"],
            crate::errors::ANALYSIS_FAILED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let app = test_app_with_model(ScriptedModel::failing());
        let cookie = app.session_cookie("uid-ana");
        let response = app
            .router
            .clone()
            .oneshot(json_post("/api/score-builder", Some(&cookie), ana_builder_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_respects_read_policy() {
        let app = test_app();
        let private = stored_cv("uid-ana", Visibility::Private);
        let public = stored_cv("uid-ana", Visibility::Public);
        app.store.insert(&private).await.unwrap();
        app.store.insert(&public).await.unwrap();

        let response = app
            .router
            .clone()
            .oneshot(json_post("/api/cv/analyze", None, json!({"cvId": private.id})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.llm.calls(), 0);

        let response = app
            .router
            .clone()
            .oneshot(json_post("/api/cv/analyze", None, json!({"cvId": public.id})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["isCv"], true);
    }

    #[tokio::test]
    async fn test_analyze_with_malformed_id_is_validation_error() {
        let app = test_app();
        let response = app
            .router
            .clone()
            .oneshot(json_post("/api/cv/analyze", None, json!({"cvId": "not-a-uuid"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(app.llm.calls(), 0);
    }
}
