//! Input validation utilities

use crate::models::LoginRequest;

/// Longest value accepted for columns stored as VARCHAR(255)
pub const MAX_FIELD_LEN: usize = 255;

/// Validate that a required text field is present and fits its column
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.chars().count() > MAX_FIELD_LEN {
        return Err(format!(
            "{} must be at most {} characters long",
            field, MAX_FIELD_LEN
        ));
    }

    Ok(())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    validate_required("Username", username)
}

/// Validate password
///
/// Only presence is checked; seeded passwords predate any complexity policy.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 1024 {
        return Err("Password must be at most 1024 bytes long".to_string());
    }

    Ok(())
}

/// Validate a login request
pub fn validate_login(request: &LoginRequest) -> Result<(), String> {
    validate_username(&request.username)?;
    validate_password(&request.password)
}
