use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::approval::{ApprovalRequestRow, ApprovalStatus};

pub struct ReviewDecision<'a> {
    pub request_id: Uuid,
    pub decision: ApprovalStatus,
    pub reviewer: &'a str,
    pub comment: Option<&'a str>,
}

pub async fn insert_request(
    pool: &PgPool,
    employee_id: Uuid,
    request_type: &str,
    details: &Value,
) -> Result<ApprovalRequestRow, AppError> {
    let request = sqlx::query_as::<_, ApprovalRequestRow>(
        r#"
        INSERT INTO approval_requests (id, employee_id, request_type, details, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(request_type)
    .bind(details)
    .bind(ApprovalStatus::Pending)
    .fetch_one(pool)
    .await?;

    info!(
        "Employee {employee_id} raised approval request {} ({request_type})",
        request.id
    );
    Ok(request)
}

pub async fn list_for_employee(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<ApprovalRequestRow>, AppError> {
    Ok(sqlx::query_as::<_, ApprovalRequestRow>(
        "SELECT * FROM approval_requests WHERE employee_id = $1 ORDER BY created_at DESC, id ASC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?)
}

/// Requests in `status`, or all requests when `status` is `None`; oldest first.
pub async fn list_by_status(
    pool: &PgPool,
    status: Option<ApprovalStatus>,
) -> Result<Vec<ApprovalRequestRow>, AppError> {
    Ok(sqlx::query_as::<_, ApprovalRequestRow>(
        r#"
        SELECT * FROM approval_requests
        WHERE ($1::text IS NULL OR status = $1)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(status)
    .fetch_all(pool)
    .await?)
}

pub async fn count_pending(pool: &PgPool, employee_id: Option<Uuid>) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM approval_requests
        WHERE status = $1 AND ($2::uuid IS NULL OR employee_id = $2)
        "#,
    )
    .bind(ApprovalStatus::Pending)
    .bind(employee_id)
    .fetch_one(pool)
    .await?)
}

/// A request can be decided once, and only to `approved` or `rejected`.
pub fn check_reviewable(current: ApprovalStatus, decision: ApprovalStatus) -> Result<(), AppError> {
    if decision == ApprovalStatus::Pending {
        return Err(AppError::Validation(
            "Decision must be 'approved' or 'rejected'".to_string(),
        ));
    }
    if current != ApprovalStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Approval request is already {}",
            current.as_str()
        )));
    }
    Ok(())
}

/// Records the HR decision. Only pending requests can be reviewed, and only once.
pub async fn review_request(
    pool: &PgPool,
    review: ReviewDecision<'_>,
) -> Result<ApprovalRequestRow, AppError> {
    let ReviewDecision {
        request_id,
        decision,
        reviewer,
        comment,
    } = review;

    let mut tx = pool.begin().await?;

    let current: ApprovalStatus =
        sqlx::query_scalar("SELECT status FROM approval_requests WHERE id = $1 FOR UPDATE")
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Approval request {request_id} not found")))?;

    check_reviewable(current, decision)?;

    let reviewed = sqlx::query_as::<_, ApprovalRequestRow>(
        r#"
        UPDATE approval_requests
        SET status = $1, reviewed_by = $2, review_comment = $3, reviewed_at = now()
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(decision)
    .bind(reviewer)
    .bind(comment)
    .bind(request_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Approval request {request_id} {} by {reviewer}",
        decision.as_str()
    );
    Ok(reviewed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_accepts_either_decision() {
        assert!(check_reviewable(ApprovalStatus::Pending, ApprovalStatus::Approved).is_ok());
        assert!(check_reviewable(ApprovalStatus::Pending, ApprovalStatus::Rejected).is_ok());
    }

    #[test]
    fn test_decided_request_is_conflict() {
        for current in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            for decision in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
                assert!(matches!(
                    check_reviewable(current, decision),
                    Err(AppError::Conflict(_))
                ));
            }
        }
    }

    #[test]
    fn test_pending_decision_is_validation_error() {
        assert!(matches!(
            check_reviewable(ApprovalStatus::Pending, ApprovalStatus::Pending),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            check_reviewable(ApprovalStatus::Approved, ApprovalStatus::Pending),
            Err(AppError::Validation(_))
        ));
    }
}
