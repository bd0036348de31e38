//! Read-only summaries backing the employee and HR dashboards.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::approvals::store as approvals;
use crate::courses::store as courses;
use crate::errors::AppError;
use crate::extract::AppPath;
use crate::models::course::{CourseStatus, SavedCourseRow};
use crate::models::employee::EmployeeRow;
use crate::profile::completeness::{compute_profile_completeness, CompletenessReport};
use crate::profile::store as profiles;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EmployeeDashboard {
    pub employee: EmployeeRow,
    pub courses: Vec<SavedCourseRow>,
    pub course_counts: BTreeMap<&'static str, usize>,
    pub completeness: CompletenessReport,
    pub pending_approvals: i64,
}

#[derive(Debug, Serialize)]
pub struct HrDashboard {
    pub employees: i64,
    pub pending_course_reviews: i64,
    pub verified_courses: i64,
    pub pending_approvals: i64,
}

/// GET /api/v1/employees/:employee_id/dashboard
pub async fn handle_employee_dashboard(
    State(state): State<AppState>,
    AppPath(employee_id): AppPath<Uuid>,
) -> Result<Json<EmployeeDashboard>, AppError> {
    let employee = profiles::get_employee(&state.db, employee_id).await?;
    let saved = courses::list_courses(&state.db, employee_id).await?;
    let pending_approvals = approvals::count_pending(&state.db, Some(employee_id)).await?;

    Ok(Json(EmployeeDashboard {
        course_counts: count_by_status(&saved),
        completeness: compute_profile_completeness(&employee, &saved),
        employee,
        courses: saved,
        pending_approvals,
    }))
}

/// GET /api/v1/hr/dashboard
pub async fn handle_hr_dashboard(
    State(state): State<AppState>,
) -> Result<Json<HrDashboard>, AppError> {
    Ok(Json(HrDashboard {
        employees: profiles::count_employees(&state.db).await?,
        pending_course_reviews: courses::count_with_status(&state.db, CourseStatus::PendingReview)
            .await?,
        verified_courses: courses::count_with_status(&state.db, CourseStatus::Verified).await?,
        pending_approvals: approvals::count_pending(&state.db, None).await?,
    }))
}

/// Count of courses per status; every status is present, zero when unused.
fn count_by_status(saved: &[SavedCourseRow]) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        CourseStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    for course in saved {
        *counts.entry(course.status.as_str()).or_default() += 1;
    }
    counts
}
