//! Request extractors resolving the caller once per request.
//!
//! Handlers never look at cookies themselves: they take `AuthUser` (session
//! required) or `MaybeAuthUser` (anonymous allowed) and work with the
//! verified `Identity` value.

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::auth::identity::Identity;
use crate::auth::session::SESSION_COOKIE;
use crate::errors::AppError;
use crate::state::AppState;

/// A request carrying a valid session.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// A request that may or may not carry a valid session.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<Identity>);

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Candidate session tokens, cookie first.
fn session_tokens(parts: &Parts) -> impl Iterator<Item = String> {
    cookie_token(parts).into_iter().chain(bearer_token(parts))
}

/// First candidate that verifies. A stale cookie does not hide a valid bearer token.
fn resolve(parts: &Parts, state: &AppState) -> Option<Identity> {
    session_tokens(parts).find_map(|token| match state.sessions.verify(&token) {
        Ok(identity) => Some(identity),
        Err(e) => {
            warn!("Session rejected: {e}");
            None
        }
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state).map(AuthUser).ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(resolve(parts, state)))
    }
}
