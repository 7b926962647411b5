//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::constants;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{2,31}$").expect("username regex is valid")
});

/// Validate username format
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err("Username must be 3-32 characters, start with a letter, and contain only letters, numbers, underscores, and hyphens")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < constants::MIN_PASSWORD_LENGTH as usize {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > constants::MAX_PASSWORD_LENGTH as usize {
        return Err("Password must be at most 128 characters");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one number");
    }
    Ok(())
}

/// Validate programming language
pub fn validate_language(language: &str) -> Result<(), &'static str> {
    if constants::languages::ALL.contains(&language) {
        Ok(())
    } else {
        Err("Unsupported programming language")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a2c-d_e").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("1starts_with_digit").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Str0ngPass").is_ok());
        assert!(validate_password("short1A").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }

    #[test]
    fn test_validate_language() {
        assert!(validate_language("rust").is_ok());
        assert!(validate_language("cpp").is_ok());
        assert!(validate_language("brainfuck").is_err());
    }
}
