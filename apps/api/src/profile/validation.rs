use std::collections::HashSet;

use crate::errors::AppError;
use crate::models::employee::{CareerGoal, Skill};
use crate::validation::{optional_text, required_text, MAX_LONG_TEXT_LEN, MAX_TEXT_LEN};

pub const MAX_SKILLS: usize = 50;
pub const MAX_GOALS: usize = 20;

/// Trims names, checks levels are 1–5 and names are unique ignoring case.
pub fn validate_skills(skills: &[Skill]) -> Result<Vec<Skill>, AppError> {
    if skills.len() > MAX_SKILLS {
        return Err(AppError::Validation(format!(
            "At most {MAX_SKILLS} skills can be listed"
        )));
    }

    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(skills.len());
    for skill in skills {
        let name = required_text("skill name", &skill.name, MAX_TEXT_LEN)?;
        if !(1..=5).contains(&skill.level) {
            return Err(AppError::Validation(format!(
                "Skill '{name}' has level {}, expected 1-5",
                skill.level
            )));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(AppError::Validation(format!(
                "Skill '{name}' is listed more than once"
            )));
        }
        cleaned.push(Skill {
            name,
            level: skill.level,
        });
    }
    Ok(cleaned)
}

/// Trims titles and descriptions and checks progress is a percentage.
pub fn validate_goals(goals: &[CareerGoal]) -> Result<Vec<CareerGoal>, AppError> {
    if goals.len() > MAX_GOALS {
        return Err(AppError::Validation(format!(
            "At most {MAX_GOALS} career goals can be set"
        )));
    }

    goals
        .iter()
        .map(|goal| -> Result<CareerGoal, AppError> {
            let title = required_text("goal title", &goal.title, MAX_TEXT_LEN)?;
            if goal.progress > 100 {
                return Err(AppError::Validation(format!(
                    "Goal '{title}' progress must be between 0 and 100"
                )));
            }
            Ok(CareerGoal {
                title,
                description: optional_text(
                    "goal description",
                    goal.description.as_deref(),
                    MAX_LONG_TEXT_LEN,
                )?,
                target_date: goal.target_date,
                progress: goal.progress,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, level: u8) -> Skill {
        Skill {
            name: name.to_string(),
            level,
        }
    }

    #[test]
    fn test_skills_trimmed() {
        let cleaned = validate_skills(&[skill("  Rust ", 4)]).unwrap();
        assert_eq!(cleaned, vec![skill("Rust", 4)]);
    }

    #[test]
    fn test_skill_level_bounds() {
        assert!(validate_skills(&[skill("Rust", 0)]).is_err());
        assert!(validate_skills(&[skill("Rust", 6)]).is_err());
        assert!(validate_skills(&[skill("Rust", 1), skill("Go", 5)]).is_ok());
    }

    #[test]
    fn test_duplicate_skill_names_rejected() {
        let err = validate_skills(&[skill("Rust", 3), skill("rust", 4)]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_too_many_skills() {
        let skills: Vec<_> = (0..=MAX_SKILLS).map(|i| skill(&format!("s{i}"), 2)).collect();
        assert!(validate_skills(&skills).is_err());
    }

    #[test]
    fn test_goal_progress_bounds() {
        let goal = CareerGoal {
            title: "Become tech lead".into(),
            description: Some("   ".into()),
            target_date: None,
            progress: 101,
        };
        assert!(validate_goals(&[goal.clone()]).is_err());

        let ok = validate_goals(&[CareerGoal {
            progress: 100,
            ..goal
        }])
        .unwrap();
        assert_eq!(ok[0].description, None);
    }

    #[test]
    fn test_blank_goal_title_rejected() {
        let goal = CareerGoal {
            title: " ".into(),
            description: None,
            target_date: None,
            progress: 0,
        };
        assert!(matches!(
            validate_goals(&[goal]),
            Err(AppError::Validation(_))
        ));
    }
}
