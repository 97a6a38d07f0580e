//! Server-issued session tokens carried in an HTTP-only cookie.
//!
//! A session is an HS256 token signed with `SESSION_SECRET`. It expires after
//! a fixed number of days and is never renewed; expiry forces a new sign-in.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::identity::Identity;

pub const SESSION_COOKIE: &str = "session";
pub const SESSION_TTL_DAYS: i64 = 5;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(SESSION_TTL_DAYS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Signs a session token for a verified identity.
    pub fn issue(&self, identity: &Identity) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: identity.uid.clone(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry and returns the identity the session was issued for.
    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)?.claims;
        Ok(Identity {
            uid: claims.sub,
            email: claims.email,
        })
    }
}
