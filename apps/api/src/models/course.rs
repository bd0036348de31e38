use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::text_column;

/// Lifecycle of a saved course.
///
/// `active → pending_review → {completed | verified | rejected | needs_demonstration}`.
/// A reviewed course re-enters `pending_review` when the employee resubmits proof.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Active,
    PendingReview,
    Completed,
    Verified,
    Rejected,
    NeedsDemonstration,
}

impl CourseStatus {
    pub const ALL: [CourseStatus; 6] = [
        CourseStatus::Active,
        CourseStatus::PendingReview,
        CourseStatus::Completed,
        CourseStatus::Verified,
        CourseStatus::Rejected,
        CourseStatus::NeedsDemonstration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Active => "active",
            CourseStatus::PendingReview => "pending_review",
            CourseStatus::Completed => "completed",
            CourseStatus::Verified => "verified",
            CourseStatus::Rejected => "rejected",
            CourseStatus::NeedsDemonstration => "needs_demonstration",
        }
    }

    /// Completed or verified by HR.
    pub fn is_finished(&self) -> bool {
        matches!(self, CourseStatus::Completed | CourseStatus::Verified)
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CourseStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown course status '{s}'"))
    }
}

text_column!(CourseStatus);

/// Decision HR records against a submitted completion proof.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approved,
    Rejected,
    NeedsDemonstration,
}

impl ReviewOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewOutcome::Approved => "approved",
            ReviewOutcome::Rejected => "rejected",
            ReviewOutcome::NeedsDemonstration => "needs_demonstration",
        }
    }
}

impl FromStr for ReviewOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(ReviewOutcome::Approved),
            "rejected" => Ok(ReviewOutcome::Rejected),
            "needs_demonstration" => Ok(ReviewOutcome::NeedsDemonstration),
            other => Err(format!("unknown review outcome '{other}'")),
        }
    }
}

text_column!(ReviewOutcome);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedCourseRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub title: String,
    pub provider: String,
    pub url: Option<String>,
    #[serde(skip)]
    pub course_key: String,
    pub status: CourseStatus,
    pub proof_file_url: Option<String>,
    pub proof_link: Option<String>,
    pub proof_submitted_at: Option<DateTime<Utc>>,
    pub verified: bool,
    pub review_outcome: Option<ReviewOutcome>,
    pub reviewed_by: Option<String>,
    pub review_feedback: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `pending_review` course joined with the owning employee, for the HR queue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingReviewRow {
    pub course_id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub employee_email: String,
    pub title: String,
    pub provider: String,
    pub proof_file_url: Option<String>,
    pub proof_link: Option<String>,
    pub proof_submitted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in CourseStatus::ALL {
            assert_eq!(status.as_str().parse::<CourseStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&CourseStatus::NeedsDemonstration).unwrap();
        assert_eq!(json, "\"needs_demonstration\"");
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("archived".parse::<CourseStatus>().is_err());
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!(
            "needs_demonstration".parse::<ReviewOutcome>().unwrap(),
            ReviewOutcome::NeedsDemonstration
        );
        assert!("maybe".parse::<ReviewOutcome>().is_err());
    }
}
