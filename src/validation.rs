//! Credential policy checks shared by the auth flows

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static USERNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w{4,24}$").unwrap());

const PASSWORD_SYMBOLS: &str = "$@#!%*?&";

/// Validate an email address, optionally pinning it to a campus domain.
pub fn validate_email(email: &str, required_domain: Option<&str>) -> AppResult<()> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if let Some(domain) = required_domain {
        let suffix = format!("@{}", domain);
        if !email.ends_with(&suffix) {
            return Err(AppError::Validation(format!(
                "Email must end with {}",
                suffix
            )));
        }
    }
    Ok(())
}

/// Usernames are 4-24 word characters.
pub fn validate_username(username: &str) -> AppResult<()> {
    if !USERNAME_RE.is_match(username.trim()) {
        return Err(AppError::Validation(
            "Username must be 4-24 letters, digits or underscores".to_string(),
        ));
    }
    Ok(())
}

/// Passwords are 6-32 characters with at least one lowercase letter, one
/// uppercase letter, one digit and one symbol.
pub fn validate_password(password: &str) -> AppResult<()> {
    let password = password.trim();
    let len = password.chars().count();
    if !(6..=32).contains(&len) {
        return Err(AppError::Validation(
            "Password must be 6-32 characters".to_string(),
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(AppError::Validation(
            "Password needs a lowercase letter, an uppercase letter, a digit and a symbol"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(validate_email("reader@example.org", None).is_ok());
        assert!(validate_email("  reader@example.org  ", None).is_ok());
        assert!(validate_email("not-an-email", None).is_err());
        assert!(validate_email("reader@campus.edu", Some("campus.edu")).is_ok());
        assert!(validate_email("reader@elsewhere.org", Some("campus.edu")).is_err());
    }

    #[test]
    fn test_username() {
        assert!(validate_username("reader_1").is_ok());
        assert!(validate_username("abc").is_err());
        assert!(validate_username("a".repeat(25).as_str()).is_err());
        assert!(validate_username("with space").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("alllowercase1!").is_err());
        assert!(validate_password("NODIGITS!").is_err());
        assert!(validate_password("NoSymbol1").is_err());
    }
}
