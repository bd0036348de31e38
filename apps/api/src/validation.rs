//! Input checks shared by the profile, course and approval handlers.
//! All of them run before any database access.

use crate::errors::AppError;

pub const MAX_TEXT_LEN: usize = 200;
pub const MAX_LONG_TEXT_LEN: usize = 2000;

/// Trims `value` and rejects it when blank or longer than `max_len` characters.
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like `required_text`, but blank input becomes `None`.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max_len).map(Some),
    }
}

/// Blank input becomes `None`; anything else must be an absolute http(s) URL.
pub fn optional_http_url(field: &str, value: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(url) = optional_text(field, value, MAX_LONG_TEXT_LEN)? else {
        return Ok(None);
    };
    let rest = url.split_once("://").and_then(|(scheme, rest)| {
        (scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http"))
            .then_some(rest)
    });
    match rest {
        Some(host_and_path) if !host_and_path.is_empty() && !host_and_path.starts_with('/') => {
            if url.chars().any(char::is_whitespace) {
                return Err(AppError::Validation(format!(
                    "{field} must not contain whitespace"
                )));
            }
            Ok(Some(url))
        }
        _ => Err(AppError::Validation(format!(
            "{field} must be an http(s) URL"
        ))),
    }
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain.
pub fn email(value: &str) -> Result<String, AppError> {
    let email = required_text("email", value, MAX_TEXT_LEN)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("title", "  Rust  ", 10).unwrap(), "Rust");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        assert!(matches!(
            required_text("title", "   ", 10),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_required_text_rejects_long() {
        assert!(required_text("title", "abcdef", 5).is_err());
        assert!(required_text("title", "ééééé", 5).is_ok());
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text("x", Some("  "), 5).unwrap(), None);
        assert_eq!(optional_text("x", None, 5).unwrap(), None);
    }

    #[test]
    fn test_http_url_accepts_http_and_https() {
        assert!(optional_http_url("link", Some("https://udemy.com/c/1")).unwrap().is_some());
        assert!(optional_http_url("link", Some("http://example.org")).unwrap().is_some());
    }

    #[test]
    fn test_http_url_scheme_is_case_insensitive() {
        assert_eq!(
            optional_http_url("link", Some("HTTPS://Coursera.org/verify/X1")).unwrap(),
            Some("HTTPS://Coursera.org/verify/X1".to_string())
        );
        assert!(optional_http_url("link", Some("Http://example.org")).unwrap().is_some());
        assert!(optional_http_url("link", Some("FTP://example.org")).is_err());
    }

    #[test]
    fn test_http_url_rejects_other_schemes() {
        assert!(optional_http_url("link", Some("ftp://example.org")).is_err());
        assert!(optional_http_url("link", Some("javascript:alert(1)")).is_err());
        assert!(optional_http_url("link", Some("https://")).is_err());
        assert!(optional_http_url("link", Some("https:///path")).is_err());
        assert!(optional_http_url("link", Some("https://a b.com")).is_err());
    }

    #[test]
    fn test_email_normalized() {
        assert_eq!(email(" Ana@Corp.COM ").unwrap(), "ana@corp.com");
    }

    #[test]
    fn test_email_rejects_malformed() {
        for bad in ["ana", "@corp.com", "ana@corp", "ana@@corp.com", "ana@.com", "a na@corp.com"] {
            assert!(email(bad).is_err(), "{bad} should be rejected");
        }
    }
}
