use regex::Regex;
use uuid::Uuid;
use validator::ValidationError;

use crate::constants::DEFAULT_TOKEN_EXPIRE_SECS;
use crate::error::AppError;

/// Fail with `"<field> is required"` when `value` is empty
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}

/// A delegated filename must be non-empty and free of `< > | * ? / \`
pub fn validate_filename(filename: &str) -> Result<(), AppError> {
    require("filename", filename)?;

    let pattern = Regex::new(r"[<>|*?/\\]").map_err(|e| {
        AppError::Internal(format!("Failed to compile filename validation regex: {}", e))
    })?;

    if pattern.is_match(filename) {
        return Err(AppError::InvalidInput(format!(
            "Filename '{}' must not contain any of: < > | * ? / \\",
            filename
        )));
    }
    Ok(())
}

/// Token lifetime in seconds; absent or empty means one day, anything else must be >= 1
pub fn parse_expire(raw: Option<&str>) -> Result<i64, AppError> {
    match raw {
        None | Some("") => Ok(DEFAULT_TOKEN_EXPIRE_SECS),
        Some(value) => match value.parse::<i64>() {
            Ok(secs) if secs >= 1 => Ok(secs),
            _ => Err(AppError::InvalidInput(format!(
                "expire must be a positive number of seconds, got '{}'",
                value
            ))),
        },
    }
}

/// Privacy must be spelled exactly `true` or `false`
pub fn parse_privacy(raw: &str) -> Result<bool, AppError> {
    match require("privacy", raw)? {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(AppError::InvalidInput(format!(
            "privacy must be 'true' or 'false', got '{}'",
            other
        ))),
    }
}

/// Declared byte size, at least 1
pub fn parse_size(raw: &str) -> Result<i64, AppError> {
    match require("size", raw)?.parse::<i64>() {
        Ok(size) if size >= 1 => Ok(size),
        _ => Err(AppError::InvalidInput(format!(
            "size must be a positive integer, got '{}'",
            raw
        ))),
    }
}

/// Crawl sources must be absolute http(s) URLs
pub fn validate_crawl_url(url: &str) -> Result<(), AppError> {
    if url.is_empty() || !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(AppError::InvalidInput(
            "url is required and must start with http:// or https://".to_string(),
        ));
    }
    Ok(())
}

pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(require(field, raw)?)
        .map_err(|_| AppError::InvalidInput(format!("{} is not a valid UUID", field)))
}

fn rejected(code: &'static str, err: AppError) -> ValidationError {
    let message = match err {
        AppError::InvalidInput(message) => message,
        other => other.to_string(),
    };
    ValidationError::new(code).with_message(message.into())
}

// Field checks for `#[validate(custom(function = ...))]` on the delegated forms

pub fn validate_filename_chars(filename: &str) -> Result<(), ValidationError> {
    validate_filename(filename).map_err(|e| rejected("filename", e))
}

pub fn validate_expire_secs(raw: &str) -> Result<(), ValidationError> {
    parse_expire(Some(raw))
        .map(|_| ())
        .map_err(|e| rejected("expire", e))
}

pub fn validate_privacy_literal(raw: &str) -> Result<(), ValidationError> {
    parse_privacy(raw)
        .map(|_| ())
        .map_err(|e| rejected("privacy", e))
}

pub fn validate_positive_size(raw: &str) -> Result<(), ValidationError> {
    parse_size(raw).map(|_| ()).map_err(|e| rejected("size", e))
}

pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    validate_crawl_url(url).map_err(|e| rejected("url", e))
}

pub fn validate_uuid_literal(raw: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(raw)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid").with_message("not a valid UUID".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FORBIDDEN_FILENAME_CHARS;

    #[test]
    fn test_filename_rejects_each_forbidden_char() {
        for c in FORBIDDEN_FILENAME_CHARS {
            let name = format!("report{}2024.pdf", c);
            assert!(validate_filename(&name).is_err(), "accepted {:?}", name);
        }
    }

    #[test]
    fn test_filename_accepts_plain_names() {
        assert!(validate_filename("report.pdf").is_ok());
        assert!(validate_filename("holiday photo (1).JPG").is_ok());
        assert!(validate_filename("").is_err());
    }

    #[test]
    fn test_expire_defaults_and_bounds() {
        assert_eq!(parse_expire(None).unwrap(), 86_400);
        assert_eq!(parse_expire(Some("")).unwrap(), 86_400);
        assert_eq!(parse_expire(Some("60")).unwrap(), 60);
        assert!(parse_expire(Some("0")).is_err());
        assert!(parse_expire(Some("-5")).is_err());
        assert!(parse_expire(Some("soon")).is_err());
    }

    #[test]
    fn test_privacy_is_strict() {
        assert!(parse_privacy("true").unwrap());
        assert!(!parse_privacy("false").unwrap());
        assert!(parse_privacy("").is_err());
        assert!(parse_privacy("TRUE").is_err());
        assert!(parse_privacy("1").is_err());
    }

    #[test]
    fn test_size_must_be_positive() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert!(parse_size("0").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("1k").is_err());
    }

    #[test]
    fn test_crawl_url_scheme() {
        assert!(validate_crawl_url("https://example.com/a.png").is_ok());
        assert!(validate_crawl_url("http://example.com/a.png").is_ok());
        assert!(validate_crawl_url("ftp://example.com/a.png").is_err());
        assert!(validate_crawl_url("").is_err());
    }

    #[test]
    fn test_field_checks_carry_the_field_code() {
        let err = validate_privacy_literal("yes").unwrap_err();
        assert_eq!(err.code, "privacy");
        assert!(err.message.unwrap().contains("'yes'"));

        assert_eq!(validate_expire_secs("0").unwrap_err().code, "expire");
        assert!(validate_expire_secs("3600").is_ok());
        assert_eq!(validate_positive_size("-1").unwrap_err().code, "size");
        assert_eq!(validate_http_url("file:///etc/passwd").unwrap_err().code, "url");
        assert_eq!(validate_filename_chars("a|b").unwrap_err().code, "filename");
        assert!(validate_uuid_literal("not-a-uuid").is_err());
        assert!(validate_uuid_literal(&Uuid::new_v4().to_string()).is_ok());
    }
}
