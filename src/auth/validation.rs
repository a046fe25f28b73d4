//! Local checks on account fields, mirroring the server's rules so obvious
//! mistakes never reach the network.

use crate::error::ValidationError;

/// Minimum password length accepted by the server.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Checks that `email` looks like `local@domain`.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `email` field.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::field("email", "Email is required"));
    }
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    }) && !email.contains(char::is_whitespace);
    if !valid {
        return Err(ValidationError::field("email", "Enter a valid email address"));
    }
    Ok(())
}

/// Checks password strength: length, upper case, lower case and a digit.
///
/// # Errors
///
/// Returns a [`ValidationError`] on `field`.
pub fn validate_new_password(field: &str, password: &str) -> Result<(), ValidationError> {
    let strong = password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit());
    if !strong {
        return Err(ValidationError::field(
            field,
            "Password must be at least 8 characters long and contain uppercase, lowercase, and numbers",
        ));
    }
    Ok(())
}

/// Checks an Indian mobile number: optional `+`, optional `91`, then ten digits.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `phone` field.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.trim();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    let all_digits = !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    let valid = all_digits
        && (digits.len() == 10 || (digits.len() == 12 && digits.starts_with("91")));
    if !valid {
        return Err(ValidationError::field("phone", "Invalid phone number format"));
    }
    Ok(())
}
