//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

const MAX_NAME_LEN: usize = 64;

/// Validate a first or last name
pub fn validate_name(value: &str, field: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "{} must be at most {} characters long",
            field, MAX_NAME_LEN
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

    match regex {
        Some(regex) if regex.is_match(email) => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length == 0 {
        return Err("Password is required".to_string());
    }
    if !(8..=128).contains(&length) {
        return Err("Password must be between 8 and 128 characters long".to_string());
    }

    let rules: [(fn(char) -> bool, &str); 4] = [
        (|c| c.is_ascii_uppercase(), "an uppercase letter"),
        (|c| c.is_ascii_lowercase(), "a lowercase letter"),
        (|c| c.is_ascii_digit(), "a digit"),
        (|c| !c.is_alphanumeric(), "a special character"),
    ];

    for (matches, what) in rules {
        if !password.chars().any(matches) {
            return Err(format!("Password must contain at least {}", what));
        }
    }

    Ok(())
}
