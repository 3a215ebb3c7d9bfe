//! Field validators for reception forms.
//!
//! Validators never fail: the boolean functions answer "is this acceptable",
//! and the `check_*` variants explain why not.

mod contact;
mod form;
mod national_id;

pub use contact::*;
pub use form::*;
pub use national_id::*;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("This field is required")]
    Required,

    #[error("Expected {expected} digits, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Only digits are allowed")]
    NonDigit,

    #[error("Check digit does not match")]
    ChecksumMismatch,

    #[error("Phone must be 0 or +593 followed by 9 digits")]
    InvalidPhone,

    #[error("Email must look like name@domain.com")]
    InvalidEmail,
}

/// Outcome of a single field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn fail(reason: ValidationError) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Field message for display, if invalid.
    pub fn message(&self) -> Option<String> {
        self.reason.as_ref().map(|r| r.to_string())
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(reason) => Self::fail(reason),
        }
    }
}
