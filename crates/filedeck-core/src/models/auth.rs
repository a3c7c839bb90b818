use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Something, `@`, something, a dot, something; no whitespace and a single `@`.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Credentials entered in the login form.
///
/// Emptiness is checked separately by [`crate::validation::validate_login`] so that a
/// blank field reports "required" instead of a format error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(regex(path = *EMAIL_PATTERN, message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}
