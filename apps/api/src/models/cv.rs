use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a stored résumé.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvStatus {
    #[default]
    Draft,
    Completed,
}

impl CvStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CvStatus::Draft => "Draft",
            CvStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(CvStatus::Draft),
            "Completed" => Some(CvStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

/// Output language of the résumé and of generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Language::Id),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
    /// Ongoing position; `end_date` is ignored when set.
    pub is_current: bool,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_current: bool,
    pub gpa: Option<String>,
}

/// The editable content of a résumé, as captured by the builder form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvContent {
    pub language: Language,
    pub first_name: String,
    pub last_name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub website: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub work_experiences: Vec<WorkExperience>,
    pub educations: Vec<Education>,
}

impl CvContent {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// A stored résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: Uuid,
    pub user_id: String,
    pub status: CvStatus,
    pub visibility: Visibility,
    pub revision: i32,
    #[serde(flatten)]
    pub content: CvContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by the dashboard listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSummary {
    pub id: Uuid,
    pub status: CvStatus,
    pub visibility: Visibility,
    pub full_name: String,
    pub job_title: String,
    pub language: Language,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<&CvRecord> for CvSummary {
    fn from(cv: &CvRecord) -> Self {
        Self {
            id: cv.id,
            status: cv.status,
            visibility: cv.visibility,
            full_name: cv.content.full_name(),
            job_title: cv.content.job_title.clone(),
            language: cv.content.language,
            revision: cv.revision,
            updated_at: cv.updated_at,
        }
    }
}

/// One immutable entry of a résumé's save history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRevision {
    pub cv_id: Uuid,
    pub revision: i32,
    pub status: CvStatus,
    pub content: CvContent,
    pub created_at: DateTime<Utc>,
}
