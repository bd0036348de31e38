// Employee profile store: basics, embedded skills and career goals, resume link.

pub mod completeness;
pub mod handlers;
pub mod store;
pub mod validation;
