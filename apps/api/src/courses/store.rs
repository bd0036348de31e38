use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::courses::dedup::{course_key, find_duplicate};
use crate::courses::workflow::{check_capacity, resolve_review, ValidProof};
use crate::errors::{unique_violation_as_conflict, AppError};
use crate::models::course::{CourseStatus, PendingReviewRow, ReviewOutcome, SavedCourseRow};

const DUPLICATE_MESSAGE: &str = "This course is already in your saved list";

pub struct NewCourse {
    pub title: String,
    pub provider: String,
    pub url: Option<String>,
}

pub struct ReviewParams<'a> {
    pub course_id: Uuid,
    pub outcome: ReviewOutcome,
    pub verified: bool,
    pub reviewer: &'a str,
    pub feedback: Option<&'a str>,
}

/// Saves a course for an employee in state `active`.
///
/// Locks the employee row so concurrent saves for the same employee serialize
/// on the capacity and duplicate checks.
pub async fn insert_course(
    pool: &PgPool,
    employee_id: Uuid,
    course: NewCourse,
) -> Result<SavedCourseRow, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1 FOR UPDATE")
        .bind(employee_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {employee_id} not found")))?;

    let existing = sqlx::query_as::<_, SavedCourseRow>(
        "SELECT * FROM saved_courses WHERE employee_id = $1",
    )
    .bind(employee_id)
    .fetch_all(&mut *tx)
    .await?;

    let key = course_key(&course.title, &course.provider);
    if find_duplicate(&existing, &key).is_some() {
        return Err(AppError::Conflict(DUPLICATE_MESSAGE.to_string()));
    }
    check_capacity(existing.len())?;

    let saved = sqlx::query_as::<_, SavedCourseRow>(
        r#"
        INSERT INTO saved_courses (id, employee_id, title, provider, url, course_key, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(&course.title)
    .bind(&course.provider)
    .bind(&course.url)
    .bind(&key)
    .bind(CourseStatus::Active)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| unique_violation_as_conflict(e, DUPLICATE_MESSAGE))?;

    tx.commit().await?;

    info!(
        "Saved course {} ('{}' by {}) for employee {employee_id}",
        saved.id, saved.title, saved.provider
    );
    Ok(saved)
}

pub async fn list_courses(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<SavedCourseRow>, AppError> {
    Ok(sqlx::query_as::<_, SavedCourseRow>(
        "SELECT * FROM saved_courses WHERE employee_id = $1 ORDER BY created_at ASC, id ASC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_course(
    pool: &PgPool,
    employee_id: Uuid,
    course_id: Uuid,
) -> Result<SavedCourseRow, AppError> {
    sqlx::query_as::<_, SavedCourseRow>(
        "SELECT * FROM saved_courses WHERE id = $1 AND employee_id = $2",
    )
    .bind(course_id)
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Saved course {course_id} not found")))
}

/// Moves a course to `pending_review` with a fresh proof timestamp.
/// A resubmission overwrites the previous proof and clears any earlier review.
pub async fn record_proof(
    pool: &PgPool,
    employee_id: Uuid,
    course_id: Uuid,
    proof: &ValidProof,
) -> Result<SavedCourseRow, AppError> {
    let updated = sqlx::query_as::<_, SavedCourseRow>(
        r#"
        UPDATE saved_courses
        SET status = $1,
            proof_file_url = $2,
            proof_link = $3,
            proof_submitted_at = now(),
            verified = false,
            review_outcome = NULL,
            reviewed_by = NULL,
            review_feedback = NULL,
            reviewed_at = NULL,
            updated_at = now()
        WHERE id = $4 AND employee_id = $5
        RETURNING *
        "#,
    )
    .bind(CourseStatus::PendingReview)
    .bind(&proof.file_url)
    .bind(&proof.link)
    .bind(course_id)
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Saved course {course_id} not found")))?;

    info!("Proof submitted for course {course_id} of employee {employee_id}");
    Ok(updated)
}

/// Applies an HR review to a course currently pending review.
pub async fn record_review(
    pool: &PgPool,
    params: ReviewParams<'_>,
) -> Result<SavedCourseRow, AppError> {
    let ReviewParams {
        course_id,
        outcome,
        verified,
        reviewer,
        feedback,
    } = params;

    let mut tx = pool.begin().await?;

    let current: CourseStatus =
        sqlx::query_scalar("SELECT status FROM saved_courses WHERE id = $1 FOR UPDATE")
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Saved course {course_id} not found")))?;

    let resolution = resolve_review(current, outcome, verified)?;

    let reviewed = sqlx::query_as::<_, SavedCourseRow>(
        r#"
        UPDATE saved_courses
        SET status = $1,
            verified = $2,
            review_outcome = $3,
            reviewed_by = $4,
            review_feedback = $5,
            reviewed_at = now(),
            updated_at = now()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(resolution.status)
    .bind(resolution.verified)
    .bind(outcome)
    .bind(reviewer)
    .bind(feedback)
    .bind(course_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Course {course_id} reviewed by {reviewer}: {} (verified={})",
        outcome.as_str(),
        resolution.verified
    );
    Ok(reviewed)
}

/// Deletes a saved course in any state.
pub async fn delete_course(
    pool: &PgPool,
    employee_id: Uuid,
    course_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM saved_courses WHERE id = $1 AND employee_id = $2")
        .bind(course_id)
        .bind(employee_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Saved course {course_id} not found"
        )));
    }

    info!("Deleted course {course_id} of employee {employee_id}");
    Ok(())
}

/// All courses awaiting HR review, oldest submission first.
pub async fn list_pending_reviews(pool: &PgPool) -> Result<Vec<PendingReviewRow>, AppError> {
    Ok(sqlx::query_as::<_, PendingReviewRow>(
        r#"
        SELECT c.id AS course_id,
               c.employee_id,
               e.name AS employee_name,
               e.email AS employee_email,
               c.title,
               c.provider,
               c.proof_file_url,
               c.proof_link,
               c.proof_submitted_at
        FROM saved_courses c
        JOIN employees e ON e.id = c.employee_id
        WHERE c.status = $1
        ORDER BY c.proof_submitted_at ASC NULLS LAST, c.id ASC
        "#,
    )
    .bind(CourseStatus::PendingReview)
    .fetch_all(pool)
    .await?)
}

/// Number of saved courses in `status` across all employees.
pub async fn count_with_status(pool: &PgPool, status: CourseStatus) -> Result<i64, AppError> {
    Ok(
        sqlx::query_scalar("SELECT COUNT(*) FROM saved_courses WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await?,
    )
}
