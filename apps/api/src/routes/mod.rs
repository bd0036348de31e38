pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::approvals::handlers as approvals;
use crate::courses::handlers as courses;
use crate::dashboard;
use crate::errors::AppError;
use crate::profile::handlers as profile;
use crate::state::AppState;

/// Headroom on top of the proof size limit for multipart framing and text parts.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

async fn route_not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_proof_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        // Employee profiles
        .route(
            "/api/v1/employees",
            post(profile::handle_create_employee).get(profile::handle_list_employees),
        )
        .route(
            "/api/v1/employees/:employee_id",
            get(profile::handle_get_employee).patch(profile::handle_update_profile),
        )
        .route(
            "/api/v1/employees/:employee_id/skills",
            put(profile::handle_replace_skills),
        )
        .route(
            "/api/v1/employees/:employee_id/goals",
            put(profile::handle_replace_goals),
        )
        .route(
            "/api/v1/employees/:employee_id/dashboard",
            get(dashboard::handle_employee_dashboard),
        )
        // Course completion workflow
        .route(
            "/api/v1/employees/:employee_id/courses",
            post(courses::handle_save_course).get(courses::handle_list_courses),
        )
        .route(
            "/api/v1/employees/:employee_id/courses/:course_id",
            delete(courses::handle_delete_course),
        )
        .route(
            "/api/v1/employees/:employee_id/courses/:course_id/proof",
            post(courses::handle_submit_proof),
        )
        .route(
            "/api/v1/employees/:employee_id/courses/:course_id/proof/upload",
            post(courses::handle_upload_proof).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Approval requests
        .route(
            "/api/v1/employees/:employee_id/approvals",
            post(approvals::handle_create_request).get(approvals::handle_list_for_employee),
        )
        // HR
        .route("/api/v1/hr/dashboard", get(dashboard::handle_hr_dashboard))
        .route(
            "/api/v1/hr/course-reviews",
            get(courses::handle_list_pending_reviews),
        )
        .route(
            "/api/v1/hr/course-reviews/:course_id",
            post(courses::handle_review_course),
        )
        .route("/api/v1/hr/approvals", get(approvals::handle_list_by_status))
        .route(
            "/api/v1/hr/approvals/:request_id/review",
            post(approvals::handle_review_request),
        )
        .fallback(route_not_found)
        .with_state(state)
}
