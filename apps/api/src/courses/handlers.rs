//! Axum route handlers for the course completion workflow.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::courses::store::{self, NewCourse, ReviewParams};
use crate::courses::workflow::{ProofSubmission, ValidProof};
use crate::errors::{ApiMessage, AppError};
use crate::extract::{AppJson, AppPath};
use crate::models::course::{PendingReviewRow, ReviewOutcome, SavedCourseRow};
use crate::profile::store::ensure_employee_exists;
use crate::state::AppState;
use crate::storage::{proof_object_key, ALLOWED_PROOF_TYPES};
use crate::validation::{
    optional_http_url, optional_text, required_text, MAX_LONG_TEXT_LEN, MAX_TEXT_LEN,
};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveCourseRequest {
    pub title: String,
    pub provider: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewCourseRequest {
    pub status: ReviewOutcome,
    #[serde(default)]
    pub verified: bool,
    pub reviewer: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Employee-facing handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/employees/:employee_id/courses
pub async fn handle_save_course(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
    AppJson(req): AppJson<SaveCourseRequest>,
) -> Result<(StatusCode, Json<SavedCourseRow>), AppError> {
    let course = NewCourse {
        title: required_text("title", &req.title, MAX_TEXT_LEN)?,
        provider: required_text("provider", &req.provider, MAX_TEXT_LEN)?,
        url: optional_http_url("url", req.url.as_deref())?,
    };

    let saved = store::insert_course(&state.db, employee_id, course).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /api/v1/employees/:employee_id/courses
pub async fn handle_list_courses(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
) -> Result<Json<Vec<SavedCourseRow>>, AppError> {
    ensure_employee_exists(&state.db, employee_id).await?;
    Ok(Json(store::list_courses(&state.db, employee_id).await?))
}

/// DELETE /api/v1/employees/:employee_id/courses/:course_id
pub async fn handle_delete_course(
    State(state): State<AppState>,
    AppPath((employee_id, course_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ApiMessage>, AppError> {
    store::delete_course(&state.db, employee_id, course_id).await?;
    Ok(ApiMessage::ok("Course removed"))
}

/// POST /api/v1/employees/:employee_id/courses/:course_id/proof
///
/// Accepts `{file_url?, link?}`. Resubmitting replaces the earlier proof.
pub async fn handle_submit_proof(
    State(state): State<AppState>,
    AppPath((employee_id, course_id)): AppPath<(Uuid, Uuid)>,
    AppJson(req): AppJson<ProofSubmission>,
) -> Result<Json<SavedCourseRow>, AppError> {
    let proof = req.validate()?;
    let updated = store::record_proof(&state.db, employee_id, course_id, &proof).await?;
    Ok(Json(updated))
}

/// POST /api/v1/employees/:employee_id/courses/:course_id/proof/upload
///
/// Multipart form with a single `file` part (pdf, png or jpeg). The file is
/// stored in object storage and its URL recorded as the proof `file_url`.
/// An optional `link` text part is kept alongside it.
pub async fn handle_upload_proof(
    State(state): State<AppState>,
    AppPath((employee_id, course_id)): AppPath<(Uuid, Uuid)>,
    mut multipart: Multipart,
) -> Result<Json<SavedCourseRow>, AppError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut link: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("proof").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, content_type, data));
            }
            Some("link") => {
                link = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;
    check_proof_file(&content_type, data.len(), state.config.max_proof_bytes)?;
    let link = optional_http_url("link", link.as_deref())?;

    // Confirm ownership before writing to storage.
    store::get_course(&state.db, employee_id, course_id).await?;

    let key = proof_object_key(employee_id, course_id, &file_name);
    let file_url = state.proof_store.put(&key, data, &content_type).await?;

    let proof = ValidProof {
        file_url: Some(file_url),
        link,
    };
    let recorded = store::record_proof(&state.db, employee_id, course_id, &proof).await;
    let updated = note_orphaned_proof(recorded, &key)?;
    Ok(Json(updated))
}

// ────────────────────────────────────────────────────────────────────────────
// HR-facing handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/hr/course-reviews
pub async fn handle_list_pending_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingReviewRow>>, AppError> {
    Ok(Json(store::list_pending_reviews(&state.db).await?))
}

/// POST /api/v1/hr/course-reviews/:course_id
pub async fn handle_review_course(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
    AppJson(req): AppJson<ReviewCourseRequest>,
) -> Result<Json<SavedCourseRow>, AppError> {
    let reviewer = required_text("reviewer", &req.reviewer, MAX_TEXT_LEN)?;
    let feedback = optional_text("feedback", req.feedback.as_deref(), MAX_LONG_TEXT_LEN)?;

    let reviewed = store::record_review(
        &state.db,
        ReviewParams {
            course_id,
            outcome: req.status,
            verified: req.verified,
            reviewer: &reviewer,
            feedback: feedback.as_deref(),
        },
    )
    .await?;
    Ok(Json(reviewed))
}

fn check_proof_file(content_type: &str, len: usize, max_bytes: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::Validation("Proof file is empty".to_string()));
    }
    if len > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Proof file exceeds {max_bytes} bytes"
        )));
    }
    if !ALLOWED_PROOF_TYPES.contains(&content_type) {
        return Err(AppError::Validation(format!(
            "Unsupported proof type '{content_type}'; use PDF, PNG or JPEG"
        )));
    }
    Ok(())
}

/// The object at `key` is already stored; if the row update failed, nothing references it.
fn note_orphaned_proof<T>(result: Result<T, AppError>, key: &str) -> Result<T, AppError> {
    if let Err(e) = &result {
        warn!("Proof object {key} was stored but not recorded: {e}");
    }
    result
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Malformed upload: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_proof_file_accepts_pdf() {
        assert!(check_proof_file("application/pdf", 1024, 4096).is_ok());
    }

    #[test]
    fn test_check_proof_file_rejects_empty() {
        assert!(matches!(
            check_proof_file("image/png", 0, 4096),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_check_proof_file_rejects_oversize() {
        assert!(matches!(
            check_proof_file("image/png", 4097, 4096),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn test_check_proof_file_rejects_type() {
        assert!(check_proof_file("application/zip", 10, 4096).is_err());
    }

    #[test]
    fn test_review_request_parses_outcome() {
        let req: ReviewCourseRequest = serde_json::from_value(serde_json::json!({
            "status": "rejected",
            "reviewer": "Dana (HR)"
        }))
        .unwrap();
        assert_eq!(req.status, ReviewOutcome::Rejected);
        assert!(!req.verified);
        assert!(req.feedback.is_none());
    }

    #[test]
    fn test_failed_record_keeps_error() {
        let failed: Result<(), AppError> = Err(AppError::Conflict("Course deleted".to_string()));
        assert!(matches!(
            note_orphaned_proof(failed, "proofs/e/c/cert.pdf"),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(note_orphaned_proof(Ok(7), "proofs/e/c/cert.pdf").unwrap(), 7);
    }
}
