//! Submit gating for the owner registration form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{check_email, check_national_id, check_phone, ValidationError, ValidationResult};

/// Fields of the owner registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    OwnerName,
    NationalId,
    Phone,
    Email,
}

/// Owner details entered at reception.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OwnerForm {
    pub owner_name: String,
    pub national_id: String,
    pub phone: String,
    /// Optional; validated only when filled in
    pub email: String,
}

/// Per-field errors and whether submit is enabled.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FormReport {
    pub errors: BTreeMap<FormField, ValidationError>,
    pub can_submit: bool,
}

impl FormReport {
    pub fn error_for(&self, field: FormField) -> Option<&ValidationError> {
        self.errors.get(&field)
    }
}

impl OwnerForm {
    /// Check every field independently.
    pub fn validate(&self) -> FormReport {
        let name = if self.owner_name.trim().is_empty() {
            ValidationResult::fail(ValidationError::Required)
        } else {
            ValidationResult::ok()
        };

        let email = if self.email.trim().is_empty() {
            ValidationResult::ok()
        } else {
            check_email(self.email.trim())
        };

        let checks = [
            (FormField::OwnerName, name),
            (FormField::NationalId, check_national_id(self.national_id.trim())),
            (FormField::Phone, check_phone(self.phone.trim())),
            (FormField::Email, email),
        ];

        let errors: BTreeMap<FormField, ValidationError> = checks
            .into_iter()
            .filter_map(|(field, result)| result.reason.map(|reason| (field, reason)))
            .collect();

        FormReport {
            can_submit: errors.is_empty(),
            errors,
        }
    }
}
