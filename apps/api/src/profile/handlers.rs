use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath};
use crate::models::employee::{CareerGoal, EmployeeRow, Skill};
use crate::profile::store::{self, NewEmployee, ProfilePatch};
use crate::profile::validation::{validate_goals, validate_skills};
use crate::state::AppState;
use crate::validation::{email, optional_http_url, optional_text, required_text, MAX_TEXT_LEN};

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
}

/// Absent fields are left alone. For `department`, `job_title` and
/// `resume_url`, an explicit `null` (or a blank string) clears the value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub resume_url: Option<Option<String>>,
}

/// Distinguishes `"field": null` (`Some(None)`) from a missing field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct SkillsRequest {
    pub skills: Vec<Skill>,
}

#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    pub goals: Vec<CareerGoal>,
}

/// POST /api/v1/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeRow>), AppError> {
    let new = NewEmployee {
        name: required_text("name", &req.name, MAX_TEXT_LEN)?,
        email: email(&req.email)?,
        department: optional_text("department", req.department.as_deref(), MAX_TEXT_LEN)?,
        job_title: optional_text("job_title", req.job_title.as_deref(), MAX_TEXT_LEN)?,
    };
    let employee = store::insert_employee(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /api/v1/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeRow>>, AppError> {
    Ok(Json(store::list_employees(&state.db).await?))
}

/// GET /api/v1/employees/:employee_id
pub async fn handle_get_employee(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
) -> Result<Json<EmployeeRow>, AppError> {
    Ok(Json(store::get_employee(&state.db, employee_id).await?))
}

/// PATCH /api/v1/employees/:employee_id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<EmployeeRow>, AppError> {
    let patch = profile_patch(&req)?;
    Ok(Json(store::update_profile(&state.db, employee_id, patch).await?))
}

/// PUT /api/v1/employees/:employee_id/skills
pub async fn handle_replace_skills(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
    AppJson(req): AppJson<SkillsRequest>,
) -> Result<Json<EmployeeRow>, AppError> {
    let skills = validate_skills(&req.skills)?;
    Ok(Json(store::replace_skills(&state.db, employee_id, skills).await?))
}

/// PUT /api/v1/employees/:employee_id/goals
pub async fn handle_replace_goals(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
    AppJson(req): AppJson<GoalsRequest>,
) -> Result<Json<EmployeeRow>, AppError> {
    let goals = validate_goals(&req.goals)?;
    Ok(Json(store::replace_goals(&state.db, employee_id, goals).await?))
}

fn profile_patch(req: &UpdateProfileRequest) -> Result<ProfilePatch, AppError> {
    let name = match req.name.as_deref() {
        Some(name) => Some(required_text("name", name, MAX_TEXT_LEN)?),
        None => None,
    };
    let patch = ProfilePatch {
        name,
        department: clearable(&req.department, |v| optional_text("department", v, MAX_TEXT_LEN))?,
        job_title: clearable(&req.job_title, |v| optional_text("job_title", v, MAX_TEXT_LEN))?,
        resume_url: clearable(&req.resume_url, |v| optional_http_url("resume_url", v))?,
    };
    if patch.name.is_none()
        && patch.department.is_none()
        && patch.job_title.is_none()
        && patch.resume_url.is_none()
    {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    Ok(patch)
}

fn clearable<F>(
    value: &Option<Option<String>>,
    check: F,
) -> Result<Option<Option<String>>, AppError>
where
    F: FnOnce(Option<&str>) -> Result<Option<String>, AppError>,
{
    value.as_ref().map(|v| check(v.as_deref())).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch_rejected() {
        assert!(profile_patch(&UpdateProfileRequest::default()).is_err());
    }

    #[test]
    fn test_blank_name_rejected_when_present() {
        let req = UpdateProfileRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(profile_patch(&req).is_err());
    }

    #[test]
    fn test_resume_url_must_be_http() {
        let req = UpdateProfileRequest {
            resume_url: Some(Some("s3://bucket/cv.pdf".into())),
            ..Default::default()
        };
        assert!(profile_patch(&req).is_err());

        let req = UpdateProfileRequest {
            resume_url: Some(Some("https://files.corp.com/cv.pdf".into())),
            ..Default::default()
        };
        let patch = profile_patch(&req).unwrap();
        assert_eq!(
            patch.resume_url,
            Some(Some("https://files.corp.com/cv.pdf".to_string()))
        );
    }

    #[test]
    fn test_null_field_is_distinct_from_missing() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"department": null, "job_title": "Lead"}"#).unwrap();
        assert_eq!(req.department, Some(None));
        assert_eq!(req.job_title, Some(Some("Lead".to_string())));
        assert_eq!(req.resume_url, None);
    }

    #[test]
    fn test_null_clears_field() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"resume_url": null}"#).unwrap();
        let patch = profile_patch(&req).unwrap();
        assert_eq!(patch.resume_url, Some(None));
        assert_eq!(patch.department, None);
        assert_eq!(patch.name, None);
    }

    #[test]
    fn test_blank_string_clears_field() {
        let req = UpdateProfileRequest {
            job_title: Some(Some("   ".into())),
            ..Default::default()
        };
        assert_eq!(profile_patch(&req).unwrap().job_title, Some(None));
    }
}
