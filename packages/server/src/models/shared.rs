use std::collections::HashSet;

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed required text field (1..=`max` Unicode characters).
pub fn validate_text(value: &str, name: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{name} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Validate an optional external link: http(s) scheme, bounded length.
pub fn validate_link(value: &str, name: &str) -> Result<(), AppError> {
    if !(value.starts_with("http://") || value.starts_with("https://")) || value.len() > 500 {
        return Err(AppError::Validation(format!(
            "{name} must be an http(s) URL of at most 500 characters"
        )));
    }
    Ok(())
}

/// Validate an optional position field (must be >= 0 when present).
pub fn validate_optional_position(pos: Option<i32>) -> Result<(), AppError> {
    if let Some(pos) = pos
        && pos < 0
    {
        return Err(AppError::Validation("Position must be >= 0".into()));
    }
    Ok(())
}

/// Validate an ordered ID list for reorder operations (non-empty, no
/// duplicates).
pub fn validate_reorder_ids(ids: &[i32], name: &str) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::Validation(format!("{name}s must not be empty")));
    }
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!(
                "Duplicate {name} {id} in reorder list"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_bounds_are_enforced() {
        assert!(validate_text("fine", "Title", 10).is_ok());
        assert!(validate_text("   ", "Title", 10).is_err());
        assert!(validate_text(&"x".repeat(11), "Title", 10).is_err());
    }

    #[test]
    fn links_require_an_http_scheme() {
        assert!(validate_link("https://example.com", "Link").is_ok());
        assert!(validate_link("http://example.com", "Link").is_ok());
        assert!(validate_link("ftp://example.com", "Link").is_err());
        assert!(validate_link("example.com", "Link").is_err());
    }

    #[test]
    fn negative_positions_are_rejected() {
        assert!(validate_optional_position(None).is_ok());
        assert!(validate_optional_position(Some(0)).is_ok());
        assert!(validate_optional_position(Some(-1)).is_err());
    }

    #[test]
    fn reorder_ids_must_be_unique_and_non_empty() {
        assert!(validate_reorder_ids(&[1, 2, 3], "project_id").is_ok());
        assert!(validate_reorder_ids(&[], "project_id").is_err());
        assert!(validate_reorder_ids(&[1, 2, 1], "project_id").is_err());
    }
}
