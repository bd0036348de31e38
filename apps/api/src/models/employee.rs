use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    /// Self-assessed proficiency, 1 (beginner) to 5 (expert).
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CareerGoal {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    /// Percent complete, 0–100.
    #[serde(default)]
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub skills: Json<Vec<Skill>>,
    pub career_goals: Json<Vec<CareerGoal>>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
