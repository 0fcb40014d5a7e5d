use crate::content::OrderKey;
use crate::error::ValidationError;

use super::MAX_SLUG_LENGTH;

/// Validate a requested feed size.
///
/// - Missing or blank → `default`
/// - Not an integer, or below 1 → [`ValidationError::InvalidLimit`]
/// - Above `max` → clamped to `max`
pub fn validate_limit(raw: Option<&str>, default: usize, max: usize) -> Result<usize, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default.min(max));
    };

    let limit: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidLimit(raw.to_string()))?;
    if limit < 1 {
        return Err(ValidationError::InvalidLimit(raw.to_string()));
    }

    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    if limit > max {
        tracing::debug!(requested = limit, max, "Clamping feed limit");
    }
    Ok(limit.min(max))
}

/// Validate a 1-based page number. Missing means 1; values below 1 become 1.
pub fn validate_page(raw: Option<&str>) -> Result<i64, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(1);
    };
    let page: i64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidPage(raw.to_string()))?;
    Ok(page.max(1))
}

/// Parse an order key (`latest` or `popular`).
pub fn validate_order(raw: &str) -> Result<OrderKey, ValidationError> {
    raw.parse()
}

/// Check that a slug is non-empty, URL-safe and of reasonable length.
///
/// Allowed characters: lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_slug(raw: &str) -> Result<&str, ValidationError> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_SLUG_LENGTH
        && raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if valid {
        Ok(raw)
    } else {
        Err(ValidationError::InvalidSlug(raw.to_string()))
    }
}
