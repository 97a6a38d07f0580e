//! Builder save workflow.
//!
//! `save` and `save as draft` share one function. An id captured from the
//! edit route selects update; no id creates a new record.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::cv::store::CvStore;
use crate::errors::AppError;
use crate::models::cv::{CvContent, CvRecord, CvStatus, Education, Visibility, WorkExperience};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Present when editing an existing résumé.
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(flatten)]
    pub cv: CvContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub id: Uuid,
    pub status: CvStatus,
    pub revision: i32,
    pub created: bool,
}

/// Persists the builder state under `status`.
pub async fn save_cv(
    store: &dyn CvStore,
    user: &Identity,
    id: Option<Uuid>,
    status: CvStatus,
    content: CvContent,
) -> Result<SaveOutcome, AppError> {
    let content = normalize(content);
    validate_required(&content, status)?;
    let now = Utc::now();

    let Some(id) = id else {
        let record = CvRecord {
            id: Uuid::new_v4(),
            user_id: user.uid.clone(),
            status,
            visibility: Visibility::Private,
            revision: 1,
            content,
            created_at: now,
            updated_at: now,
        };
        store.insert(&record).await.map_err(AppError::Storage)?;
        info!("Created cv {} ({}) for user {}", record.id, status.as_str(), user.uid);
        return Ok(SaveOutcome {
            id: record.id,
            status,
            revision: record.revision,
            created: true,
        });
    };

    let existing = store
        .get(id)
        .await
        .map_err(AppError::Storage)?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} tidak ditemukan")))?;
    if existing.user_id != user.uid {
        return Err(AppError::Forbidden);
    }

    // id, owner, visibility and created_at carry over from the stored record
    let updated = CvRecord {
        status,
        content,
        updated_at: now,
        ..existing
    };
    let revision = store
        .update(&updated)
        .await
        .map_err(AppError::Storage)?
        .ok_or_else(|| AppError::NotFound(format!("CV {id} tidak ditemukan")))?;

    info!("Saved cv {id} ({}) revision {revision}", status.as_str());
    Ok(SaveOutcome {
        id,
        status,
        revision,
        created: false,
    })
}

/// Required-field presence only. Drafts need just a first name.
pub fn validate_required(cv: &CvContent, status: CvStatus) -> Result<(), AppError> {
    let mut missing = Vec::new();
    if cv.first_name.is_empty() {
        missing.push("firstName".to_string());
    }

    if status == CvStatus::Completed {
        if cv.last_name.is_empty() {
            missing.push("lastName".to_string());
        }
        if cv.email.is_empty() {
            missing.push("email".to_string());
        }
        for (i, exp) in cv.work_experiences.iter().enumerate() {
            if exp.job_title.is_empty() {
                missing.push(format!("workExperiences[{i}].jobTitle"));
            }
            if exp.company.is_empty() {
                missing.push(format!("workExperiences[{i}].company"));
            }
        }
        for (i, edu) in cv.educations.iter().enumerate() {
            if edu.degree.is_empty() {
                missing.push(format!("educations[{i}].degree"));
            }
            if edu.institution.is_empty() {
                missing.push(format!("educations[{i}].institution"));
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Kolom wajib belum diisi: {}",
            missing.join(", ")
        )))
    }
}

/// Trims text, drops blank list items, dedups skills and clears end dates of
/// ongoing entries.
pub fn normalize(cv: CvContent) -> CvContent {
    CvContent {
        language: cv.language,
        first_name: cv.first_name.trim().to_string(),
        last_name: cv.last_name.trim().to_string(),
        job_title: cv.job_title.trim().to_string(),
        email: cv.email.trim().to_string(),
        phone: cv.phone.trim().to_string(),
        address: cv.address.trim().to_string(),
        linkedin: cv.linkedin.trim().to_string(),
        website: cv.website.trim().to_string(),
        summary: cv.summary.trim().to_string(),
        skills: dedup_skills(cv.skills),
        work_experiences: cv
            .work_experiences
            .into_iter()
            .map(normalize_experience)
            .collect(),
        educations: cv.educations.into_iter().map(normalize_education).collect(),
    }
}

fn normalize_experience(exp: WorkExperience) -> WorkExperience {
    let end_date = if exp.is_current { None } else { non_blank(exp.end_date) };
    WorkExperience {
        job_title: exp.job_title.trim().to_string(),
        company: exp.company.trim().to_string(),
        location: exp.location.trim().to_string(),
        start_date: exp.start_date.trim().to_string(),
        end_date,
        is_current: exp.is_current,
        description: exp.description.trim().to_string(),
        achievements: exp
            .achievements
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
    }
}

fn normalize_education(edu: Education) -> Education {
    let end_date = if edu.is_current { None } else { non_blank(edu.end_date) };
    Education {
        degree: edu.degree.trim().to_string(),
        institution: edu.institution.trim().to_string(),
        location: edu.location.trim().to_string(),
        start_date: edu.start_date.trim().to_string(),
        end_date,
        is_current: edu.is_current,
        gpa: non_blank(edu.gpa),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ana_identity, ana_putri, MemoryCvStore};

    fn other_identity() -> Identity {
        Identity {
            uid: "uid-budi".to_string(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_save_without_id_assigns_new_id() {
        let store = MemoryCvStore::default();
        let outcome = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri())
            .await
            .unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.revision, 1);

        let stored = store.get(outcome.id).await.unwrap().unwrap();
        assert_eq!(stored.user_id, "uid-ana");
        assert_eq!(stored.status, CvStatus::Draft);
    }

    #[tokio::test]
    async fn test_two_creates_get_distinct_ids() {
        let store = MemoryCvStore::default();
        let a = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri())
            .await
            .unwrap();
        let b = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri())
            .await
            .unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_save_with_id_keeps_id_and_bumps_revision() {
        let store = MemoryCvStore::default();
        let first = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri())
            .await
            .unwrap();

        let mut edited = ana_putri();
        edited.summary = "Backend engineer focused on Go services.".to_string();
        edited.email = "ana@example.com".to_string();
        let second = save_cv(
            &store,
            &ana_identity(),
            Some(first.id),
            CvStatus::Completed,
            edited,
        )
        .await
        .unwrap();

        assert_eq!(second.id, first.id);
        assert!(!second.created);
        assert_eq!(second.revision, 2);

        let stored = store.get(first.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CvStatus::Completed);
        assert_eq!(stored.content.summary, "Backend engineer focused on Go services.");
        assert_eq!(store.revisions(first.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_other_users_cv_forbidden() {
        let store = MemoryCvStore::default();
        let first = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri())
            .await
            .unwrap();
        let result = save_cv(
            &store,
            &other_identity(),
            Some(first.id),
            CvStatus::Draft,
            ana_putri(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
        assert_eq!(store.get(first.id).await.unwrap().unwrap().revision, 1);
    }

    #[tokio::test]
    async fn test_save_unknown_id_not_found() {
        let store = MemoryCvStore::default();
        let result = save_cv(
            &store,
            &ana_identity(),
            Some(Uuid::new_v4()),
            CvStatus::Draft,
            ana_putri(),
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_storage_error() {
        let store = MemoryCvStore::failing();
        let result = save_cv(&store, &ana_identity(), None, CvStatus::Draft, ana_putri()).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }

    #[test]
    fn test_draft_needs_only_first_name() {
        let cv = CvContent {
            first_name: "Ana".to_string(),
            ..Default::default()
        };
        assert!(validate_required(&cv, CvStatus::Draft).is_ok());
        assert!(validate_required(&cv, CvStatus::Completed).is_err());
    }

    #[test]
    fn test_blank_first_name_rejected() {
        let cv = normalize(CvContent {
            first_name: "   ".to_string(),
            ..Default::default()
        });
        let err = validate_required(&cv, CvStatus::Draft).unwrap_err();
        assert!(err.to_string().contains("firstName"));
    }

    #[test]
    fn test_completed_checks_nested_entries() {
        let cv = CvContent {
            first_name: "Ana".to_string(),
            last_name: "Putri".to_string(),
            email: "ana@example.com".to_string(),
            work_experiences: vec![WorkExperience {
                job_title: "Backend Engineer".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = validate_required(&cv, CvStatus::Completed).unwrap_err();
        assert!(err.to_string().contains("workExperiences[0].company"));
    }

    #[test]
    fn test_ongoing_clears_end_date() {
        let cv = normalize(CvContent {
            work_experiences: vec![WorkExperience {
                end_date: Some("2023-01".to_string()),
                is_current: true,
                ..Default::default()
            }],
            educations: vec![Education {
                end_date: Some("  ".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(cv.work_experiences[0].end_date, None);
        assert_eq!(cv.educations[0].end_date, None);
    }

    #[test]
    fn test_skills_dedup_case_insensitive() {
        let skills = dedup_skills(vec![
            "Go".to_string(),
            " rust ".to_string(),
            "go".to_string(),
            "".to_string(),
            "Rust".to_string(),
        ]);
        assert_eq!(skills, vec!["Go", "rust"]);
    }
}
