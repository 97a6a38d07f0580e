pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::cv::handlers as cv;
use crate::generation::handlers as generation;
use crate::scoring::extract::MAX_FILE_BYTES;
use crate::scoring::handlers::{self as scoring, MULTIPART_SLACK_BYTES};
use crate::state::AppState;
use crate::upload::handlers as upload;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session
        .route(
            "/api/auth/session",
            get(auth::handle_get_session)
                .post(auth::handle_create_session)
                .delete(auth::handle_delete_session),
        )
        // Stored résumés
        .route("/api/cv", get(cv::handle_list).post(cv::handle_save))
        .route("/api/cv/draft", post(cv::handle_save_draft))
        .route("/api/cv/download", get(cv::handle_download))
        .route("/api/cv/analyze", post(scoring::handle_analyze))
        .route("/api/cv/:id", get(cv::handle_get).delete(cv::handle_delete))
        .route("/api/cv/:id/history", get(cv::handle_history))
        .route("/api/cv/:id/visibility", patch(cv::handle_set_visibility))
        // Scoring
        .route(
            "/api/score-file",
            post(scoring::handle_score_file)
                .layer(DefaultBodyLimit::max(MAX_FILE_BYTES + MULTIPART_SLACK_BYTES)),
        )
        .route("/api/score-builder", post(scoring::handle_score_builder))
        // Generation
        .route("/api/generate/summary", post(generation::handle_generate_summary))
        .route(
            "/api/generate/work-experience",
            post(generation::handle_generate_work_experience),
        )
        // Uploads
        .route("/api/upload", post(upload::handle_create_upload))
        .with_state(state)
}
