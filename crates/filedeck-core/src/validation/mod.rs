//! Validation modules

use std::collections::BTreeMap;
use validator::Validate;

use crate::error::AppError;
use crate::models::LoginRequest;

/// Field name -> message, one message per field.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validates the login form and returns one message per offending field.
pub fn validate_login(request: &LoginRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if request.email.is_empty() {
        errors.insert("email", "Email is required".to_string());
    }
    if request.password.is_empty() {
        errors.insert("password", "Password is required".to_string());
    }

    if let Err(validation) = request.validate() {
        for (field, field_errors) in validation.field_errors() {
            let key: &'static str = match field.as_ref() {
                "email" => "email",
                "password" => "password",
                _ => continue,
            };
            if errors.contains_key(key) {
                continue;
            }
            if let Some(message) = field_errors
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            {
                errors.insert(key, message);
            }
        }
    }

    errors
}

/// Like [`validate_login`], but collapses the field errors into an [`AppError`].
pub fn ensure_login_valid(request: &LoginRequest) -> Result<(), AppError> {
    let errors = validate_login(request);
    if errors.is_empty() {
        return Ok(());
    }
    let joined = errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(AppError::InvalidInput(joined))
}
