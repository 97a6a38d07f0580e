//! Read and delete authorization for stored résumés.
//!
//! Reads distinguish a missing record (404) from a denied one (403).
//! Deletes collapse both into 404 so a caller cannot test for other
//! users' record ids.

use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::cv::store::CvStore;
use crate::errors::AppError;
use crate::models::cv::{CvRecord, Visibility};

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("CV {id} tidak ditemukan"))
}

/// Public records are readable by anyone; private ones only by their owner.
pub fn can_read(cv: &CvRecord, caller: Option<&Identity>) -> bool {
    match cv.visibility {
        Visibility::Public => true,
        Visibility::Private => caller.is_some_and(|c| c.uid == cv.user_id),
    }
}

/// Loads a record and applies the read policy.
pub async fn load_readable(
    store: &dyn CvStore,
    id: Uuid,
    caller: Option<&Identity>,
) -> Result<CvRecord, AppError> {
    let cv = store
        .get(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| not_found(id))?;
    if !can_read(&cv, caller) {
        return Err(AppError::Forbidden);
    }
    Ok(cv)
}

/// Loads a record the caller must own (history, visibility changes).
pub async fn load_owned(
    store: &dyn CvStore,
    id: Uuid,
    caller: &Identity,
) -> Result<CvRecord, AppError> {
    let cv = store
        .get(id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| not_found(id))?;
    if cv.user_id != caller.uid {
        return Err(AppError::Forbidden);
    }
    Ok(cv)
}

/// Deletes a record owned by the caller. Not-owned and nonexistent ids
/// produce the same error, and a not-owned record stays stored.
pub async fn delete_cv(store: &dyn CvStore, id: Uuid, caller: &Identity) -> Result<(), AppError> {
    let removed = store
        .delete_owned(id, &caller.uid)
        .await
        .map_err(AppError::Storage)?;
    if !removed {
        return Err(not_found(id));
    }
    info!("Deleted cv {id} for user {}", caller.uid);
    Ok(())
}
