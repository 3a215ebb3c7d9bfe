//! National identity number (cédula) checksum.
//!
//! Ten digits; the tenth is a modulus-10 check digit over the first nine,
//! where digits at even positions are doubled (minus 9 when above 9).

use super::{ValidationError, ValidationResult};

/// Length of a national ID.
pub const NATIONAL_ID_LENGTH: usize = 10;

/// Compute the check digit for the first nine digits.
///
/// Returns `None` unless `first_nine` is exactly nine ASCII digits.
pub fn national_id_check_digit(first_nine: &str) -> Option<u8> {
    if first_nine.len() != NATIONAL_ID_LENGTH - 1 {
        return None;
    }

    let mut sum: u32 = 0;
    for (i, c) in first_nine.chars().enumerate() {
        let digit = c.to_digit(10)?;
        sum += if i % 2 == 0 {
            let doubled = digit * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            digit
        };
    }

    Some(((10 - sum % 10) % 10) as u8)
}

/// Check a national ID, reporting the first failure.
pub fn check_national_id(id: &str) -> ValidationResult {
    national_id_reason(id).into()
}

fn national_id_reason(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Required);
    }
    let actual = id.chars().count();
    if actual != NATIONAL_ID_LENGTH {
        return Err(ValidationError::WrongLength {
            expected: NATIONAL_ID_LENGTH,
            actual,
        });
    }
    if !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NonDigit);
    }

    let expected = national_id_check_digit(&id[..NATIONAL_ID_LENGTH - 1]);
    let last = id[NATIONAL_ID_LENGTH - 1..]
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8);

    match (expected, last) {
        (Some(e), Some(l)) if e == l => Ok(()),
        _ => Err(ValidationError::ChecksumMismatch),
    }
}

/// Whether `id` is a well-formed national ID with a matching check digit.
pub fn validate_national_id(id: &str) -> bool {
    national_id_reason(id).is_ok()
}
