//! Test doubles and fixtures shared by unit and router tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::identity::{Identity, IdentityError, IdentityVerifier};
use crate::auth::session::{SessionManager, SESSION_COOKIE};
use crate::config::Config;
use crate::cv::store::CvStore;
use crate::llm_client::{LanguageModel, LlmError};
use crate::models::cv::{CvContent, CvRecord, CvRevision, CvSummary, Visibility};
use crate::routes::build_router;
use crate::state::AppState;
use crate::upload::UploadSigner;

// ────────────────────────────────────────────────────────────────────────────
// Language model
// ────────────────────────────────────────────────────────────────────────────

/// Returns a fixed reply (or a fixed upstream failure) and records prompts.
pub struct ScriptedModel {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as an overloaded upstream would.
    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(LlmError::Api {
            status: 529,
            message: "Overloaded".to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Identity provider
// ────────────────────────────────────────────────────────────────────────────

pub const VALID_ID_TOKEN: &str = "valid-id-token-for-ana";

pub struct StaticVerifier;

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, id_token: &str) -> Result<Identity, IdentityError> {
        if id_token == VALID_ID_TOKEN {
            Ok(ana_identity())
        } else {
            Err(IdentityError::UnknownKey(None))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document store
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    records: HashMap<Uuid, CvRecord>,
    revisions: Vec<CvRevision>,
}

/// In-memory `CvStore` with the same revision semantics as `PgCvStore`.
#[derive(Default)]
pub struct MemoryCvStore {
    inner: Mutex<MemoryInner>,
    fail: bool,
}

impl MemoryCvStore {
    /// Every operation fails, as an unreachable database would.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(anyhow!("store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CvStore for MemoryCvStore {
    async fn insert(&self, cv: &CvRecord) -> Result<()> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        if inner.records.contains_key(&cv.id) {
            return Err(anyhow!("duplicate id {}", cv.id));
        }
        let record = CvRecord {
            revision: 1,
            ..cv.clone()
        };
        inner.revisions.push(CvRevision {
            cv_id: cv.id,
            revision: 1,
            status: cv.status,
            content: cv.content.clone(),
            created_at: Utc::now(),
        });
        inner.records.insert(cv.id, record);
        Ok(())
    }

    async fn update(&self, cv: &CvRecord) -> Result<Option<i32>> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let Some(stored) = inner.records.get_mut(&cv.id) else {
            return Ok(None);
        };
        stored.status = cv.status;
        stored.content = cv.content.clone();
        stored.updated_at = cv.updated_at;
        stored.revision += 1;
        let revision = stored.revision;
        inner.revisions.push(CvRevision {
            cv_id: cv.id,
            revision,
            status: cv.status,
            content: cv.content.clone(),
            created_at: Utc::now(),
        });
        Ok(Some(revision))
    }

    async fn get(&self, id: Uuid) -> Result<Option<CvRecord>> {
        self.check()?;
        Ok(self.inner.lock().unwrap().records.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<CvSummary>> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        let mut owned: Vec<&CvRecord> = inner
            .records
            .values()
            .filter(|cv| cv.user_id == user_id)
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned.into_iter().map(CvSummary::from).collect())
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<bool> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        match inner.records.get_mut(&id) {
            Some(cv) => {
                cv.visibility = visibility;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_owned(&self, id: Uuid, user_id: &str) -> Result<bool> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.records.get(&id).is_some_and(|cv| cv.user_id == user_id) {
            return Ok(false);
        }
        inner.records.remove(&id);
        inner.revisions.retain(|r| r.cv_id != id);
        Ok(true)
    }

    async fn revisions(&self, id: Uuid) -> Result<Vec<CvRevision>> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        let mut revisions: Vec<CvRevision> = inner
            .revisions
            .iter()
            .filter(|r| r.cv_id == id)
            .cloned()
            .collect();
        revisions.sort_by_key(|r| r.revision);
        Ok(revisions)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Router harness
// ────────────────────────────────────────────────────────────────────────────

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCvStore>,
    pub llm: Arc<ScriptedModel>,
    pub sessions: SessionManager,
}

impl TestApp {
    /// A `Cookie` header value carrying a valid session for `uid`.
    pub fn session_cookie(&self, uid: &str) -> String {
        let token = self
            .sessions
            .issue(&Identity {
                uid: uid.to_string(),
                email: None,
            })
            .unwrap();
        format!("{SESSION_COOKIE}={token}")
    }
}

/// Router wired to in-memory doubles. The model replies with `sample_report_json()`.
pub fn test_app() -> TestApp {
    test_app_with_model(ScriptedModel::replying(&sample_report_json().to_string()))
}

pub fn test_app_with_model(model: ScriptedModel) -> TestApp {
    let config = Config::for_tests();
    let store = Arc::new(MemoryCvStore::default());
    let llm = Arc::new(model);
    let sessions = SessionManager::new(&config.session_secret);

    let state = AppState {
        store: store.clone(),
        llm: llm.clone(),
        identity: Arc::new(StaticVerifier),
        sessions: sessions.clone(),
        uploads: test_signer(),
        config,
    };

    TestApp {
        router: build_router(state),
        store,
        llm,
        sessions,
    }
}

/// Signer with static credentials against a local endpoint. Presigning is offline.
pub fn test_signer() -> UploadSigner {
    let config = Config::for_tests();
    let s3_config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(config.s3_region))
        .credentials_provider(Credentials::new(
            config.aws_access_key_id,
            config.aws_secret_access_key,
            None,
            None,
            "cvjitu-test",
        ))
        .endpoint_url(config.s3_endpoint)
        .force_path_style(true)
        .build();
    UploadSigner::new(aws_sdk_s3::Client::from_conf(s3_config), config.s3_bucket)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Fixtures
// ────────────────────────────────────────────────────────────────────────────

pub fn ana_identity() -> Identity {
    Identity {
        uid: "uid-ana".to_string(),
        email: Some("ana@example.com".to_string()),
    }
}

/// A draft with only a name, a title and one skill.
pub fn ana_putri() -> CvContent {
    CvContent {
        first_name: "Ana".to_string(),
        last_name: "Putri".to_string(),
        job_title: "Backend Engineer".to_string(),
        skills: vec!["Go".to_string()],
        ..Default::default()
    }
}

pub fn stored_cv(owner: &str, visibility: Visibility) -> CvRecord {
    let now = Utc::now();
    CvRecord {
        id: Uuid::new_v4(),
        user_id: owner.to_string(),
        status: Default::default(),
        visibility,
        revision: 1,
        content: ana_putri(),
        created_at: now,
        updated_at: now,
    }
}

/// A well-formed model reply. Section scores are deliberately above the
/// missing-section cap so the cap is observable.
pub fn sample_report_json() -> Value {
    json!({
        "isCv": true,
        "overallScore": 62,
        "atsCompatibility": 70,
        "keywordMatch": 55,
        "readability": 80,
        "sections": [
            {"name": "summary", "score": 45, "status": "needs_improvement", "feedback": "Ringkasan masih kosong."},
            {"name": "work_experience", "score": 50, "status": "needs_improvement", "feedback": "Belum ada pengalaman kerja."},
            {"name": "education", "score": 40, "status": "needs_improvement", "feedback": "Belum ada pendidikan."},
            {"name": "skills", "score": 60, "status": "needs_improvement", "feedback": "Tambahkan keahlian lain."}
        ],
        "suggestions": [
            "Tambahkan ringkasan profil.",
            "Cantumkan pengalaman kerja terbaru."
        ]
    })
}
