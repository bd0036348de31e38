//! Status transitions for saved courses. Pure functions; the store applies
//! them inside the transaction that reads the current row.

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::course::{CourseStatus, ReviewOutcome};
use crate::validation::optional_http_url;

/// An employee may keep at most this many saved courses, in any state.
pub const MAX_SAVED_COURSES: usize = 3;

pub fn check_capacity(saved: usize) -> Result<(), AppError> {
    if saved >= MAX_SAVED_COURSES {
        return Err(AppError::Conflict(format!(
            "You can save at most {MAX_SAVED_COURSES} courses. Remove one before adding another."
        )));
    }
    Ok(())
}

/// Completion proof as submitted: an uploaded file URL, an external link, or both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProofSubmission {
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A proof that passed validation. At least one field is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProof {
    pub file_url: Option<String>,
    pub link: Option<String>,
}

impl ProofSubmission {
    pub fn validate(&self) -> Result<ValidProof, AppError> {
        let file_url = optional_http_url("file_url", self.file_url.as_deref())?;
        let link = optional_http_url("link", self.link.as_deref())?;
        if file_url.is_none() && link.is_none() {
            return Err(AppError::Validation(
                "Provide a proof file_url or a link".to_string(),
            ));
        }
        Ok(ValidProof { file_url, link })
    }
}

/// Status and verified flag a review leaves the course in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewResolution {
    pub status: CourseStatus,
    pub verified: bool,
}

/// Resolves an HR decision against the course's current status.
///
/// Only `pending_review` courses can be reviewed; any outcome is allowed from there.
/// `verified` only survives an approval.
pub fn resolve_review(
    current: CourseStatus,
    outcome: ReviewOutcome,
    verified: bool,
) -> Result<ReviewResolution, AppError> {
    if current != CourseStatus::PendingReview {
        return Err(AppError::Conflict(format!(
            "Course is '{current}', only courses pending review can be reviewed"
        )));
    }

    let resolution = match outcome {
        ReviewOutcome::Approved if verified => ReviewResolution {
            status: CourseStatus::Verified,
            verified: true,
        },
        ReviewOutcome::Approved => ReviewResolution {
            status: CourseStatus::Completed,
            verified: false,
        },
        ReviewOutcome::Rejected => ReviewResolution {
            status: CourseStatus::Rejected,
            verified: false,
        },
        ReviewOutcome::NeedsDemonstration => ReviewResolution {
            status: CourseStatus::NeedsDemonstration,
            verified: false,
        },
    };
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_allows_up_to_three() {
        assert!(check_capacity(0).is_ok());
        assert!(check_capacity(2).is_ok());
    }

    #[test]
    fn test_fourth_course_rejected() {
        assert!(matches!(check_capacity(3), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_proof_requires_some_url() {
        let err = ProofSubmission::default().validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let blank = ProofSubmission {
            file_url: Some("  ".into()),
            link: Some("".into()),
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_proof_link_only() {
        let proof = ProofSubmission {
            file_url: None,
            link: Some(" https://coursera.org/verify/ABC ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(proof.link.as_deref(), Some("https://coursera.org/verify/ABC"));
        assert_eq!(proof.file_url, None);
    }

    #[test]
    fn test_proof_rejects_non_http() {
        let proof = ProofSubmission {
            file_url: Some("file:///tmp/cert.pdf".into()),
            link: None,
        };
        assert!(proof.validate().is_err());
    }

    #[test]
    fn test_rejection_sets_rejected_and_clears_verified() {
        let r = resolve_review(CourseStatus::PendingReview, ReviewOutcome::Rejected, true).unwrap();
        assert_eq!(r.status, CourseStatus::Rejected);
        assert!(!r.verified);
    }

    #[test]
    fn test_verified_approval() {
        let r = resolve_review(CourseStatus::PendingReview, ReviewOutcome::Approved, true).unwrap();
        assert_eq!(
            r,
            ReviewResolution {
                status: CourseStatus::Verified,
                verified: true
            }
        );
    }

    #[test]
    fn test_unverified_approval_is_completed() {
        let r =
            resolve_review(CourseStatus::PendingReview, ReviewOutcome::Approved, false).unwrap();
        assert_eq!(r.status, CourseStatus::Completed);
        assert!(!r.verified);
    }

    #[test]
    fn test_needs_demonstration() {
        let r = resolve_review(
            CourseStatus::PendingReview,
            ReviewOutcome::NeedsDemonstration,
            true,
        )
        .unwrap();
        assert_eq!(r.status, CourseStatus::NeedsDemonstration);
        assert!(!r.verified);
    }

    #[test]
    fn test_review_requires_pending() {
        for status in [
            CourseStatus::Active,
            CourseStatus::Completed,
            CourseStatus::Verified,
            CourseStatus::Rejected,
            CourseStatus::NeedsDemonstration,
        ] {
            let err = resolve_review(status, ReviewOutcome::Approved, true).unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)), "{status} should conflict");
        }
    }
}
