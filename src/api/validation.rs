//! Input validation for API requests.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for a plausible email address (full validation is the mail
    /// server's job)
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    /// Regex for usernames (alphanumeric with dots, dashes, underscores)
    static ref USERNAME_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 {
        return Err("Email is too long".to_string());
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }
    Ok(())
}

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }
    if username.len() > 32 {
        return Err("Username is too long (max 32 characters)".to_string());
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username must be alphanumeric with dots, dashes, or underscores".to_string(),
        );
    }
    Ok(())
}

/// Validate a UUID-formatted identifier
pub fn validate_uuid(id: &str, field: &str) -> Result<(), String> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| format!("{field} must be a valid UUID"))
}

/// Validate the number of weeks for a generation run
pub fn validate_num_weeks(num_weeks: u32) -> Result<(), String> {
    if num_weeks == 0 {
        return Err("Number of weeks must be at least 1".to_string());
    }
    if num_weeks > 52 {
        return Err("Number of weeks must be at most 52".to_string());
    }
    Ok(())
}
