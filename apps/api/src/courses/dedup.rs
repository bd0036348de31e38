use crate::models::course::SavedCourseRow;

/// Identity of a saved course: lowercased title and provider with whitespace collapsed.
///
/// The title is length-prefixed so no title/provider split can produce another pair's key.
pub fn course_key(title: &str, provider: &str) -> String {
    let title = normalize(title);
    format!("{}:{}|{}", title.len(), title, normalize(provider))
}

/// Returns the already-saved course sharing `key`, if any.
pub fn find_duplicate<'a>(existing: &'a [SavedCourseRow], key: &str) -> Option<&'a SavedCourseRow> {
    existing.iter().find(|course| course.course_key == key)
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
