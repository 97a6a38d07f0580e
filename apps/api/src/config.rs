use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub firebase_project_id: String,
    pub session_secret: String,
    /// Origin allowed to call the API with credentials. Unset = permissive, no credentials.
    pub allowed_origin: Option<String>,
    pub cookie_secure: bool,
    pub port: u16,
    pub rust_log: String,
}

const MIN_SESSION_SECRET_LEN: usize = 32;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_secret = require_env("SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            firebase_project_id: require_env("FIREBASE_PROJECT_ID")?,
            session_secret,
            allowed_origin: std::env::var("ALLOWED_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

#[cfg(test)]
impl Config {
    /// Configuration with placeholder credentials for router tests.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/cvjitu_test".to_string(),
            s3_bucket: "cvjitu-test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            aws_access_key_id: "test-access-key".to_string(),
            aws_secret_access_key: "test-secret-key".to_string(),
            anthropic_api_key: "test-anthropic-key".to_string(),
            firebase_project_id: "cvjitu-test".to_string(),
            session_secret: "0123456789abcdef0123456789abcdef".to_string(),
            allowed_origin: None,
            cookie_secure: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_env_missing_names_variable() {
        let err = require_env("CVJITU_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("CVJITU_SURELY_UNSET_VARIABLE"));
    }
}
