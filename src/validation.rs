use crate::error::{ApiError, Result};

/// Validates a required text field: not blank after trimming and at most
/// `max_len` characters. Returns the trimmed value.
pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ApiError::ValidationError(format!("{} must not be empty", field)));
    }

    let len = trimmed.chars().count();
    if len > max_len {
        return Err(ApiError::ValidationError(format!(
            "{} must be at most {} characters, got {}",
            field, max_len, len
        )));
    }

    Ok(trimmed.to_string())
}

/// Like [`require_text`] but blank values collapse to `None`.
pub fn optional_text(field: &str, value: Option<&str>, max_len: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => require_text(field, v, max_len).map(Some),
    }
}

pub fn require_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(ApiError::ValidationError(format!(
            "{} must not be negative, got {}",
            field, value
        )));
    }
    Ok(())
}
