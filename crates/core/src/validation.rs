//! Input checks performed before any sheet write is attempted.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum participant password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reject blank values for required fields.
///
/// `fields` pairs a human-readable label with the submitted value.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| *label)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Required fields missing: {}",
            missing.join(", ")
        )))
    }
}

/// Validate a new password and its confirmation.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), CoreError> {
    if password.is_empty() || confirm.is_empty() {
        return Err(CoreError::Validation(
            "Please enter and confirm the new password".into(),
        ));
    }
    if password != confirm {
        return Err(CoreError::Validation("Passwords do not match".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

/// Validate the shape of an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )))
    }
}

/// Validate an overall progress percentage.
pub fn validate_progress(progress: u8) -> Result<(), CoreError> {
    if progress > 100 {
        return Err(CoreError::Validation(
            "Progress must be between 0 and 100".into(),
        ));
    }
    Ok(())
}
