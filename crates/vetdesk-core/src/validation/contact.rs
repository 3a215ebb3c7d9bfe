//! Phone and email format checks.

use std::sync::LazyLock;

use regex::Regex;

use super::{ValidationError, ValidationResult};

/// `+593` or a leading zero, then nine digits.
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+593|0)[0-9]{9}$").expect("Invalid phone regex pattern"));

/// `local@domain.tld` with a two-or-more letter TLD.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").expect("Invalid email regex pattern"));

/// Whether `phone` is a local (0XXXXXXXXX) or international (+593XXXXXXXXX) number.
pub fn validate_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(phone)
}

pub fn check_phone(phone: &str) -> ValidationResult {
    if phone.is_empty() {
        ValidationResult::fail(ValidationError::Required)
    } else if validate_phone(phone) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(ValidationError::InvalidPhone)
    }
}

/// Whether `email` has the `local@domain.tld` shape.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

pub fn check_email(email: &str) -> ValidationResult {
    if email.is_empty() {
        ValidationResult::fail(ValidationError::Required)
    } else if validate_email(email) {
        ValidationResult::ok()
    } else {
        ValidationResult::fail(ValidationError::InvalidEmail)
    }
}
