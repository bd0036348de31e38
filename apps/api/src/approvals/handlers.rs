use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::approvals::store::{self, ReviewDecision};
use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::approval::{ApprovalRequestRow, ApprovalStatus};
use crate::profile::store::ensure_employee_exists;
use crate::state::AppState;
use crate::validation::{optional_text, required_text, MAX_LONG_TEXT_LEN, MAX_TEXT_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateApprovalRequest {
    pub request_type: String,
    #[serde(default)]
    pub details: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewApprovalRequest {
    pub decision: ApprovalStatus,
    pub reviewer: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// POST /api/v1/employees/:employee_id/approvals
pub async fn handle_create_request(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
    AppJson(req): AppJson<CreateApprovalRequest>,
) -> Result<(StatusCode, Json<ApprovalRequestRow>), AppError> {
    let request_type = required_text("request_type", &req.request_type, MAX_TEXT_LEN)?;
    let details = request_details(req.details)?;

    ensure_employee_exists(&state.db, employee_id).await?;
    let request = store::insert_request(&state.db, employee_id, &request_type, &details).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/v1/employees/:employee_id/approvals
pub async fn handle_list_for_employee(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
) -> Result<Json<Vec<ApprovalRequestRow>>, AppError> {
    ensure_employee_exists(&state.db, employee_id).await?;
    Ok(Json(store::list_for_employee(&state.db, employee_id).await?))
}

/// GET /api/v1/hr/approvals?status=pending
pub async fn handle_list_by_status(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<StatusFilter>,
) -> Result<Json<Vec<ApprovalRequestRow>>, AppError> {
    Ok(Json(store::list_by_status(&state.db, filter.status).await?))
}

/// POST /api/v1/hr/approvals/:request_id/review
pub async fn handle_review_request(
    State(state): State<AppState>,
    AppPath(request_id): AppPath<Uuid>,
    AppJson(req): AppJson<ReviewApprovalRequest>,
) -> Result<Json<ApprovalRequestRow>, AppError> {
    let reviewer = required_text("reviewer", &req.reviewer, MAX_TEXT_LEN)?;
    let comment = optional_text("comment", req.comment.as_deref(), MAX_LONG_TEXT_LEN)?;

    let reviewed = store::review_request(
        &state.db,
        ReviewDecision {
            request_id,
            decision: req.decision,
            reviewer: &reviewer,
            comment: comment.as_deref(),
        },
    )
    .await?;
    Ok(Json(reviewed))
}

/// Missing or null details become `{}`; anything but a JSON object is rejected.
fn request_details(details: Option<Value>) -> Result<Value, AppError> {
    match details {
        None | Some(Value::Null) => Ok(Value::Object(Default::default())),
        Some(value @ Value::Object(_)) => Ok(value),
        Some(_) => Err(AppError::Validation(
            "details must be a JSON object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_details_default_to_empty_object() {
        assert_eq!(request_details(None).unwrap(), json!({}));
        assert_eq!(request_details(Some(Value::Null)).unwrap(), json!({}));
    }

    #[test]
    fn test_details_must_be_object() {
        assert!(request_details(Some(json!(["a"]))).is_err());
        assert!(request_details(Some(json!("text"))).is_err());
        assert_eq!(
            request_details(Some(json!({"skill": "Rust"}))).unwrap(),
            json!({"skill": "Rust"})
        );
    }

    #[test]
    fn test_status_filter_parses() {
        let filter: StatusFilter = serde_json::from_value(json!({"status": "approved"})).unwrap();
        assert_eq!(filter.status, Some(ApprovalStatus::Approved));
        let filter: StatusFilter = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filter.status, None);
    }
}
