//! Registration input validation

use regex::Regex;
use std::sync::OnceLock;

use crate::models::RegisterRequest;

fn username_regex() -> &'static Regex {
    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("username regex is valid")
    })
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("email regex is valid")
    })
}

/// 3 to 32 letters, digits or underscores
pub fn validate_username(username: &str) -> Result<(), String> {
    match username.chars().count() {
        0 => Err("Username is required".to_string()),
        1..=2 => Err("Username must be at least 3 characters long".to_string()),
        33.. => Err("Username must be at most 32 characters long".to_string()),
        _ if !username_regex().is_match(username) => {
            Err("Username can only contain letters, numbers, and underscores".to_string())
        }
        _ => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 || !email_regex().is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// 8 to 128 characters mixing upper and lower case letters, digits and symbols
pub fn validate_password(password: &str) -> Result<(), String> {
    let length = password.chars().count();
    if length == 0 {
        return Err("Password is required".to_string());
    }
    if length < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    if length > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let requirements: [(fn(&char) -> bool, &str); 4] = [
        (char::is_ascii_uppercase, "an uppercase letter"),
        (char::is_ascii_lowercase, "a lowercase letter"),
        (char::is_ascii_digit, "a digit"),
        (|c: &char| !c.is_alphanumeric(), "a special character"),
    ];

    for (matches, label) in requirements {
        if !password.chars().any(|c| matches(&c)) {
            return Err(format!("Password must contain at least {}", label));
        }
    }

    Ok(())
}

/// Validate every registration field, reporting the first failure
pub fn validate_registration(request: &RegisterRequest) -> Result<(), String> {
    validate_username(&request.username)?;
    validate_email(&request.email)?;
    validate_password(&request.password)
}
