use std::sync::Arc;

use crate::auth::identity::IdentityVerifier;
use crate::auth::session::SessionManager;
use crate::config::Config;
use crate::cv::store::CvStore;
use crate::llm_client::LanguageModel;
use crate::upload::UploadSigner;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every external collaborator is a handle constructed in `main`, so tests can
/// substitute doubles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CvStore>,
    pub llm: Arc<dyn LanguageModel>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub sessions: SessionManager,
    pub uploads: UploadSigner,
    pub config: Config,
}
