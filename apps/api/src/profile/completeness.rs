use serde::{Deserialize, Serialize};

use crate::models::course::{CourseStatus, SavedCourseRow};
use crate::models::employee::EmployeeRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: String,
    pub score: f64,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub sections: Vec<SectionHealth>,
    pub missing_sections: Vec<String>,
}

const SECTION_WEIGHTS: &[(&str, f64)] = &[
    ("basics", 0.20),
    ("skills", 0.30),
    ("goals", 0.20),
    ("resume", 0.10),
    ("learning", 0.20),
];

/// Skill count at which the skills section is considered complete.
const TARGET_SKILLS: usize = 5;

/// Scores how complete an employee's profile is, section by section.
/// Scores are in `0.0..=1.0`; `overall_score` is the weight-normalized sum.
pub fn compute_profile_completeness(
    employee: &EmployeeRow,
    courses: &[SavedCourseRow],
) -> CompletenessReport {
    let mut sections = Vec::new();
    let mut missing_sections = Vec::new();
    let mut weighted_score_sum = 0.0;

    for (section_key, weight) in SECTION_WEIGHTS {
        let (score, recommendations) = match *section_key {
            "basics" => score_basics(employee),
            "skills" => score_skills(employee),
            "goals" => score_goals(employee),
            "resume" => score_resume(employee),
            _ => score_learning(courses),
        };

        let status = match score {
            s if s >= 0.8 => SectionStatus::Strong,
            s if s >= 0.5 => SectionStatus::Moderate,
            s if s > 0.0 => SectionStatus::Weak,
            _ => SectionStatus::Missing,
        };
        if status == SectionStatus::Missing {
            missing_sections.push(section_key.to_string());
        }

        weighted_score_sum += score * weight;
        sections.push(SectionHealth {
            section: section_key.to_string(),
            score,
            status,
            recommendations,
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let overall_score = if total_weight > 0.0 {
        (weighted_score_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CompletenessReport {
        overall_score,
        sections,
        missing_sections,
    }
}

fn score_basics(employee: &EmployeeRow) -> (f64, Vec<String>) {
    let mut recommendations = Vec::new();
    if employee.department.is_none() {
        recommendations.push("Add your department".to_string());
    }
    if employee.job_title.is_none() {
        recommendations.push("Add your job title".to_string());
    }
    let filled = 2 - recommendations.len();
    (filled as f64 / 2.0, recommendations)
}

fn score_skills(employee: &EmployeeRow) -> (f64, Vec<String>) {
    let count = employee.skills.len();
    let score = (count as f64 / TARGET_SKILLS as f64).clamp(0.0, 1.0);
    let recommendations = if count < TARGET_SKILLS {
        vec![format!(
            "List at least {TARGET_SKILLS} skills ({count} so far)"
        )]
    } else {
        vec![]
    };
    (score, recommendations)
}

fn score_goals(employee: &EmployeeRow) -> (f64, Vec<String>) {
    let goals = &employee.career_goals;
    if goals.is_empty() {
        return (0.0, vec!["Set at least one career goal".to_string()]);
    }
    let dated = goals.iter().filter(|g| g.target_date.is_some()).count();
    let mut recommendations = Vec::new();
    if dated < goals.len() {
        recommendations.push(format!(
            "{} goal(s) have no target date",
            goals.len() - dated
        ));
    }
    (0.6 + 0.4 * dated as f64 / goals.len() as f64, recommendations)
}

fn score_resume(employee: &EmployeeRow) -> (f64, Vec<String>) {
    if employee.resume_url.is_some() {
        (1.0, vec![])
    } else {
        (0.0, vec!["Link your resume".to_string()])
    }
}

fn score_learning(courses: &[SavedCourseRow]) -> (f64, Vec<String>) {
    if courses.is_empty() {
        return (0.0, vec!["Save a course to start tracking your learning".to_string()]);
    }
    if courses.iter().any(|c| c.status.is_finished()) {
        return (1.0, vec![]);
    }
    if courses.iter().any(|c| c.status == CourseStatus::PendingReview) {
        return (0.7, vec![]);
    }
    let mut recommendations =
        vec!["Submit completion proof for a saved course".to_string()];
    if courses
        .iter()
        .any(|c| c.status == CourseStatus::NeedsDemonstration)
    {
        recommendations.push("HR asked for a demonstration on one of your courses".to_string());
    }
    (0.4, recommendations)
}
