//! Pre-signed PUT URLs and upload key naming.

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::extract::{DOCX_MIME, PDF_MIME};

/// Lifetime of every signed upload URL.
pub const UPLOAD_URL_EXPIRY_SECS: u64 = 60;

const MAX_FILE_NAME_CHARS: usize = 100;

pub const ALLOWED_UPLOAD_TYPES: [&str; 5] =
    ["image/jpeg", "image/png", "image/webp", PDF_MIME, DOCX_MIME];

#[derive(Clone)]
pub struct UploadSigner {
    client: S3Client,
    bucket: String,
}

impl UploadSigner {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Signs a PUT for `key`. The client must send the same Content-Type.
    pub async fn presign_put(&self, key: &str, content_type: &str) -> Result<String, AppError> {
        let config = PresigningConfig::expires_in(Duration::from_secs(UPLOAD_URL_EXPIRY_SECS))
            .map_err(|e| AppError::S3(format!("invalid presigning config: {e}")))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(config)
            .await
            .map_err(|e| AppError::S3(format!("presigning failed: {e}")))?;
        info!("Signed upload for s3://{}/{}", self.bucket, key);
        Ok(request.uri().to_string())
    }
}

pub fn is_allowed_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    ALLOWED_UPLOAD_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(essence))
}

/// Reduces a client-supplied file name to `[A-Za-z0-9._-]`, dropping any
/// directory part. Returns `None` when nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.chars().all(|c| matches!(c, '.' | '_' | '-')) {
        return None;
    }
    Some(cleaned.to_string())
}

/// `uploads/<uid>/<uuid>-<file name>`
pub fn upload_key(uid: &str, file_name: &str) -> String {
    format!("uploads/{uid}/{}-{file_name}", Uuid::new_v4())
}
