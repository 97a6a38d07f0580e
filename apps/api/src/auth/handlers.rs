use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::identity::Identity;
use crate::auth::session::{SESSION_COOKIE, SESSION_TTL_DAYS};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub status: &'static str,
}

const SUCCESS: SessionStatus = SessionStatus { status: "success" };

/// POST /api/auth/session
///
/// Verifies the identity token with the provider and sets the session cookie.
pub async fn handle_create_session(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionStatus>), AppError> {
    // A body without a usable token gets the same 401 as a rejected token.
    let Json(req) = payload.map_err(|e| {
        warn!("Session request rejected: {}", e.body_text());
        AppError::Unauthorized
    })?;
    if req.id_token.trim().is_empty() {
        return Err(AppError::Unauthorized);
    }

    let identity = state.identity.verify(&req.id_token).await.map_err(|e| {
        warn!("Identity token rejected: {e}");
        AppError::Unauthorized
    })?;

    let token = state.sessions.issue(&identity).map_err(|e| {
        warn!("Session signing failed: {e}");
        AppError::Unauthorized
    })?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build();

    info!("Session issued for user {}", identity.uid);
    Ok((jar.add(cookie), Json(SUCCESS)))
}

/// DELETE /api/auth/session
///
/// Clears the cookie. Reports success whether or not a session existed.
pub async fn handle_delete_session(jar: CookieJar) -> (CookieJar, Json<SessionStatus>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(SUCCESS))
}

/// GET /api/auth/session
pub async fn handle_get_session(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}
