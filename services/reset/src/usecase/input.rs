//! Shape checks that run before any store access.

use crate::domain::types::{CODE_LEN, MAX_IDENTIFIER_LEN, MIN_CREDENTIAL_LEN};
use crate::error::ResetError;

pub fn validate_identifier(identifier: &str) -> Result<(), ResetError> {
    if identifier.is_empty() {
        return Err(ResetError::validation("email is required"));
    }
    if identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(ResetError::validation("email is too long"));
    }
    if identifier.chars().any(char::is_whitespace) {
        return Err(ResetError::validation("email must not contain whitespace"));
    }
    Ok(())
}

pub fn validate_code(code: &str) -> Result<(), ResetError> {
    if code.is_empty() {
        return Err(ResetError::validation("otp is required"));
    }
    if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResetError::validation(format!(
            "otp must be {CODE_LEN} digits"
        )));
    }
    Ok(())
}

pub fn validate_new_credential(credential: &str, confirmation: &str) -> Result<(), ResetError> {
    if credential.is_empty() {
        return Err(ResetError::validation("password is required"));
    }
    if confirmation.is_empty() {
        return Err(ResetError::validation("confirm_password is required"));
    }
    if credential != confirmation {
        return Err(ResetError::validation("passwords do not match"));
    }
    if credential.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ResetError::validation(format!(
            "password must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }
    Ok(())
}
