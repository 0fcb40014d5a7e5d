use crate::error::ValidationError;

/// Clean a display name read from untrusted input.
///
/// Control characters (including ANSI escape introducers) are removed and
/// surrounding whitespace trimmed. Names that end up empty are rejected.
pub fn sanitize_name(name: &str) -> Result<String, ValidationError> {
    let cleaned: String = name.chars().filter(|c| !c.is_control()).collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidName(
            "name cannot be empty or whitespace-only".to_string(),
        ));
    }
    Ok(trimmed.to_owned())
}
