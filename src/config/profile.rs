use crate::error::{AppError, AppResult};

/// Checks a profile name against `^[A-Za-z0-9_-]+$`.
///
/// The name is used verbatim as a directory name, a container name suffix and
/// a launcher file name, so it is validated before anything touches storage.
pub fn validate_profile_name(requested: &str) -> AppResult<&str> {
    if requested.is_empty() {
        return Err(AppError::InvalidName(requested.to_string()));
    }

    let valid = requested
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::InvalidName(requested.to_string()));
    }

    Ok(requested)
}

pub fn is_valid_profile_name(candidate: &str) -> bool {
    validate_profile_name(candidate).is_ok()
}
