//! Identity-token verification against the managed auth provider.
//!
//! The client signs in with the provider and posts the resulting ID token.
//! `FirebaseVerifier` checks it against the provider's published JWKS.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("no provider key matches kid {0:?}")]
    UnknownKey(Option<String>),

    #[error("failed to fetch provider keys: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error("identity token has no subject")]
    MissingSubject,
}

/// Exchanges a client-held identity token for a verified identity.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct ProviderClaims {
    sub: String,
    email: Option<String>,
}

/// Verifies Firebase Authentication ID tokens (RS256, rotating keys).
#[derive(Clone)]
pub struct FirebaseVerifier {
    client: reqwest::Client,
    project_id: String,
    jwks_url: String,
}

impl FirebaseVerifier {
    pub fn new(project_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            project_id,
            jwks_url: FIREBASE_JWKS_URL.to_string(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("{FIREBASE_ISSUER_PREFIX}{}", self.project_id)]);
        validation
    }

    async fn fetch_keys(&self) -> Result<JwkSet, IdentityError> {
        let keys = self
            .client
            .get(&self.jwks_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        debug!("Fetched {} provider signing keys", keys.keys.len());
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let header = decode_header(id_token)?;
        let keys = self.fetch_keys().await?;
        let jwk = header
            .kid
            .as_deref()
            .and_then(|kid| keys.find(kid))
            .ok_or_else(|| IdentityError::UnknownKey(header.kid.clone()))?;
        let key = DecodingKey::from_jwk(jwk)?;

        let claims = decode::<ProviderClaims>(id_token, &key, &self.validation())?.claims;
        identity_from_claims(claims)
    }
}

fn identity_from_claims(claims: ProviderClaims) -> Result<Identity, IdentityError> {
    if claims.sub.trim().is_empty() {
        return Err(IdentityError::MissingSubject);
    }
    Ok(Identity {
        uid: claims.sub,
        email: claims.email,
    })
}
