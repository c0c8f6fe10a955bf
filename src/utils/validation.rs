use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    // Page templates carry a `{page}` placeholder that is not valid in a URL path
    let probe = url_str.replace("{page}", "1");
    match Url::parse(&probe) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// Rejects blank values and `${VAR}` placeholders left behind by an unset
/// environment variable.
pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    if value.starts_with("${") && value.ends_with('}') {
        return Err(EtlError::MissingConfigError {
            field: format!("{} (environment variable {})", field_name, value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("listings.url_template", "https://example.com/{page}").is_ok());
        assert!(validate_url("discussion.api_base", "http://example.com").is_ok());
        assert!(validate_url("discussion.api_base", "").is_err());
        assert!(validate_url("discussion.api_base", "invalid-url").is_err());
        assert!(validate_url("discussion.api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("page_depth", 4, 1).is_ok());
        assert!(validate_positive_number("page_depth", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("threshold", 0.1, -1.0, 1.0).is_ok());
        assert!(validate_range("threshold", 1.5, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_unresolved_env_placeholder_is_missing() {
        let err = validate_non_empty_string("discussion.client_id", "${REDDIT_CLIENT_ID}")
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigError { .. }));
        assert!(validate_non_empty_string("discussion.client_id", "   ").is_err());
        assert!(validate_non_empty_string("discussion.client_id", "abc123").is_ok());
    }
}
