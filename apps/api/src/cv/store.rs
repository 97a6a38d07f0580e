//! Document storage for résumés.
//!
//! The live record is overwritten on each save (last write wins). Every save
//! also appends an immutable revision, so history survives the overwrite.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::cv::{CvContent, CvRecord, CvRevision, CvStatus, CvSummary, Visibility};

#[async_trait]
pub trait CvStore: Send + Sync {
    /// Stores a new record as revision 1.
    async fn insert(&self, cv: &CvRecord) -> Result<()>;

    /// Overwrites content, status and `updated_at` of an existing record and
    /// appends a revision. Returns the new revision number, or `None` if the
    /// record no longer exists.
    async fn update(&self, cv: &CvRecord) -> Result<Option<i32>>;

    async fn get(&self, id: Uuid) -> Result<Option<CvRecord>>;

    /// The owner's records, most recently updated first.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<CvSummary>>;

    /// Returns false if no record with this id exists.
    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<bool>;

    /// Deletes the record only if `user_id` owns it. Returns whether a row was removed.
    async fn delete_owned(&self, id: Uuid, user_id: &str) -> Result<bool>;

    /// Revisions in ascending order.
    async fn revisions(&self, id: Uuid) -> Result<Vec<CvRevision>>;
}

#[derive(Debug, FromRow)]
struct CvRow {
    id: Uuid,
    user_id: String,
    status: String,
    visibility: String,
    revision: i32,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CvRow> for CvRecord {
    type Error = anyhow::Error;

    fn try_from(row: CvRow) -> Result<Self> {
        let status = CvStatus::parse(&row.status)
            .ok_or_else(|| anyhow!("cv {} has unknown status '{}'", row.id, row.status))?;
        let visibility = Visibility::parse(&row.visibility)
            .ok_or_else(|| anyhow!("cv {} has unknown visibility '{}'", row.id, row.visibility))?;
        let content: CvContent = serde_json::from_value(row.data)?;
        Ok(CvRecord {
            id: row.id,
            user_id: row.user_id,
            status,
            visibility,
            revision: row.revision,
            content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct RevisionRow {
    cv_id: Uuid,
    revision: i32,
    status: String,
    data: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<RevisionRow> for CvRevision {
    type Error = anyhow::Error;

    fn try_from(row: RevisionRow) -> Result<Self> {
        Ok(CvRevision {
            cv_id: row.cv_id,
            revision: row.revision,
            status: CvStatus::parse(&row.status)
                .ok_or_else(|| anyhow!("revision has unknown status '{}'", row.status))?,
            content: serde_json::from_value(row.data)?,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL-backed store. Content lives in a JSONB column.
#[derive(Clone)]
pub struct PgCvStore {
    pool: PgPool,
}

impl PgCvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CvStore for PgCvStore {
    async fn insert(&self, cv: &CvRecord) -> Result<()> {
        let data = serde_json::to_value(&cv.content)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cvs
                (id, user_id, status, visibility, language, revision, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 1, $6, $7, $8)
            "#,
        )
        .bind(cv.id)
        .bind(&cv.user_id)
        .bind(cv.status.as_str())
        .bind(cv.visibility.as_str())
        .bind(cv.content.language.as_str())
        .bind(&data)
        .bind(cv.created_at)
        .bind(cv.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO cv_revisions (cv_id, revision, status, data) VALUES ($1, 1, $2, $3)",
        )
        .bind(cv.id)
        .bind(cv.status.as_str())
        .bind(&data)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Inserted cv {} for user {}", cv.id, cv.user_id);
        Ok(())
    }

    async fn update(&self, cv: &CvRecord) -> Result<Option<i32>> {
        let data = serde_json::to_value(&cv.content)?;
        let mut tx = self.pool.begin().await?;

        let revision: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE cvs
            SET status = $2, language = $3, data = $4, updated_at = $5, revision = revision + 1
            WHERE id = $1
            RETURNING revision
            "#,
        )
        .bind(cv.id)
        .bind(cv.status.as_str())
        .bind(cv.content.language.as_str())
        .bind(&data)
        .bind(cv.updated_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(revision) = revision else {
            return Ok(None);
        };

        // Append-only: revisions are never updated
        sqlx::query(
            "INSERT INTO cv_revisions (cv_id, revision, status, data) VALUES ($1, $2, $3, $4)",
        )
        .bind(cv.id)
        .bind(revision)
        .bind(cv.status.as_str())
        .bind(&data)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Updated cv {} to revision {revision}", cv.id);
        Ok(Some(revision))
    }

    async fn get(&self, id: Uuid) -> Result<Option<CvRecord>> {
        let row = sqlx::query_as::<_, CvRow>(
            r#"
            SELECT id, user_id, status, visibility, revision, data, created_at, updated_at
            FROM cvs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CvRecord::try_from).transpose()
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<CvSummary>> {
        let rows = sqlx::query_as::<_, CvRow>(
            r#"
            SELECT id, user_id, status, visibility, revision, data, created_at, updated_at
            FROM cvs
            WHERE user_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| CvRecord::try_from(row).map(|cv| CvSummary::from(&cv)))
            .collect()
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> Result<bool> {
        let result = sqlx::query("UPDATE cvs SET visibility = $2 WHERE id = $1")
            .bind(id)
            .bind(visibility.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revisions(&self, id: Uuid) -> Result<Vec<CvRevision>> {
        let rows = sqlx::query_as::<_, RevisionRow>(
            r#"
            SELECT cv_id, revision, status, data, created_at
            FROM cv_revisions
            WHERE cv_id = $1
            ORDER BY revision ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(CvRevision::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, visibility: &str) -> CvRow {
        CvRow {
            id: Uuid::new_v4(),
            user_id: "uid-ana".to_string(),
            status: status.to_string(),
            visibility: visibility.to_string(),
            revision: 3,
            data: serde_json::json!({"firstName": "Ana", "skills": ["Go"]}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_record() {
        let cv = CvRecord::try_from(row("Draft", "public")).unwrap();
        assert_eq!(cv.status, CvStatus::Draft);
        assert_eq!(cv.visibility, Visibility::Public);
        assert_eq!(cv.revision, 3);
        assert_eq!(cv.content.first_name, "Ana");
    }

    #[test]
    fn test_row_with_unknown_status_rejected() {
        assert!(CvRecord::try_from(row("Archived", "private")).is_err());
    }
}
