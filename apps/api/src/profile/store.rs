use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::{unique_violation_as_conflict, AppError};
use crate::models::employee::{CareerGoal, EmployeeRow, Skill};

pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
}

/// Partial profile update; `None` leaves the column unchanged.
/// `Some(None)` sets a nullable column back to NULL.
#[derive(Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub department: Option<Option<String>>,
    pub job_title: Option<Option<String>>,
    pub resume_url: Option<Option<String>>,
}

fn new_value(field: &Option<Option<String>>) -> Option<&str> {
    field.as_ref().and_then(Option::as_deref)
}

pub async fn insert_employee(pool: &PgPool, new: NewEmployee) -> Result<EmployeeRow, AppError> {
    let employee = sqlx::query_as::<_, EmployeeRow>(
        r#"
        INSERT INTO employees (id, name, email, department, job_title)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.department)
    .bind(&new.job_title)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        let message = format!("An employee with email {} already exists", new.email);
        unique_violation_as_conflict(e, &message)
    })?;

    info!("Created employee {} <{}>", employee.id, employee.email);
    Ok(employee)
}

pub async fn list_employees(pool: &PgPool) -> Result<Vec<EmployeeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees ORDER BY name ASC, id ASC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn get_employee(pool: &PgPool, employee_id: Uuid) -> Result<EmployeeRow, AppError> {
    sqlx::query_as::<_, EmployeeRow>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found(employee_id))
}

pub async fn ensure_employee_exists(pool: &PgPool, employee_id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM employees WHERE id = $1)")
        .bind(employee_id)
        .fetch_one(pool)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(not_found(employee_id))
    }
}

pub async fn count_employees(pool: &PgPool) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(pool)
        .await?)
}

pub async fn update_profile(
    pool: &PgPool,
    employee_id: Uuid,
    patch: ProfilePatch,
) -> Result<EmployeeRow, AppError> {
    let employee = sqlx::query_as::<_, EmployeeRow>(
        r#"
        UPDATE employees
        SET name = COALESCE($1, name),
            department = CASE WHEN $2 THEN $3 ELSE department END,
            job_title = CASE WHEN $4 THEN $5 ELSE job_title END,
            resume_url = CASE WHEN $6 THEN $7 ELSE resume_url END,
            updated_at = now()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&patch.name)
    .bind(patch.department.is_some())
    .bind(new_value(&patch.department))
    .bind(patch.job_title.is_some())
    .bind(new_value(&patch.job_title))
    .bind(patch.resume_url.is_some())
    .bind(new_value(&patch.resume_url))
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(employee_id))?;

    info!("Updated profile of employee {employee_id}");
    Ok(employee)
}

/// Replaces the embedded skills array wholesale (last write wins).
pub async fn replace_skills(
    pool: &PgPool,
    employee_id: Uuid,
    skills: Vec<Skill>,
) -> Result<EmployeeRow, AppError> {
    let count = skills.len();
    let employee = sqlx::query_as::<_, EmployeeRow>(
        "UPDATE employees SET skills = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(Json(skills))
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(employee_id))?;

    info!("Replaced skills of employee {employee_id} ({count} skills)");
    Ok(employee)
}

/// Replaces the embedded career goals array wholesale (last write wins).
pub async fn replace_goals(
    pool: &PgPool,
    employee_id: Uuid,
    goals: Vec<CareerGoal>,
) -> Result<EmployeeRow, AppError> {
    let count = goals.len();
    let employee = sqlx::query_as::<_, EmployeeRow>(
        "UPDATE employees SET career_goals = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(Json(goals))
    .bind(employee_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found(employee_id))?;

    info!("Replaced career goals of employee {employee_id} ({count} goals)");
    Ok(employee)
}

fn not_found(employee_id: Uuid) -> AppError {
    AppError::NotFound(format!("Employee {employee_id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_value_for_set_clear_and_keep() {
        assert_eq!(new_value(&Some(Some("Sales".to_string()))), Some("Sales"));
        assert_eq!(new_value(&Some(None)), None);
        assert_eq!(new_value(&None), None);
    }
}
