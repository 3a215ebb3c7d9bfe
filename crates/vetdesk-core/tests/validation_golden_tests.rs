//! Golden tests for the reception form validators.

use vetdesk_core::validation::{
    check_national_id, validate_email, validate_national_id, validate_phone, FormField,
    OwnerForm, ValidationError,
};

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    input: &'static str,
    expected: bool,
}

fn national_id_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase { id: "valid-pichincha", input: "1710034065", expected: true },
        GoldenCase { id: "valid-azuay", input: "0102030400", expected: true },
        GoldenCase { id: "valid-all-zero", input: "0000000000", expected: true },
        GoldenCase { id: "bad-check-digit", input: "1710034064", expected: false },
        GoldenCase { id: "transposed", input: "7110034065", expected: false },
        GoldenCase { id: "too-short", input: "171003406", expected: false },
        GoldenCase { id: "too-long", input: "17100340650", expected: false },
        GoldenCase { id: "letters", input: "17100340A5", expected: false },
        GoldenCase { id: "empty", input: "", expected: false },
    ]
}

fn phone_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase { id: "local-mobile", input: "0999123456", expected: true },
        GoldenCase { id: "international", input: "+593999123456", expected: true },
        GoldenCase { id: "missing-prefix", input: "999123456", expected: false },
        GoldenCase { id: "local-too-long", input: "09991234567", expected: false },
        GoldenCase { id: "other-country", input: "+14155550123", expected: false },
        GoldenCase { id: "dashes", input: "099-912-3456", expected: false },
        GoldenCase { id: "empty", input: "", expected: false },
    ]
}

fn email_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase { id: "minimal", input: "a@b.com", expected: true },
        GoldenCase { id: "subdomain", input: "citas@vet.quito.ec", expected: true },
        GoldenCase { id: "plus-tag", input: "ana+citas@correo.com", expected: true },
        GoldenCase { id: "no-tld", input: "a@b", expected: false },
        GoldenCase { id: "short-tld", input: "a@b.c", expected: false },
        GoldenCase { id: "numeric-tld", input: "a@b.12", expected: false },
        GoldenCase { id: "space", input: "ana maria@correo.com", expected: false },
        GoldenCase { id: "no-local", input: "@correo.com", expected: false },
    ]
}

#[test]
fn test_national_id_golden() {
    for case in national_id_cases() {
        assert_eq!(
            validate_national_id(case.input),
            case.expected,
            "case {}",
            case.id
        );
    }
}

#[test]
fn test_phone_golden() {
    for case in phone_cases() {
        assert_eq!(validate_phone(case.input), case.expected, "case {}", case.id);
    }
}

#[test]
fn test_email_golden() {
    for case in email_cases() {
        assert_eq!(validate_email(case.input), case.expected, "case {}", case.id);
    }
}

#[test]
fn test_national_id_reasons() {
    assert_eq!(
        check_national_id("7110034065").reason,
        Some(ValidationError::ChecksumMismatch)
    );
    assert_eq!(
        check_national_id("17100340A5").reason,
        Some(ValidationError::NonDigit)
    );
}

#[test]
fn test_owner_form_gates_submit() {
    let mut form = OwnerForm {
        owner_name: "Luis Andrade".to_string(),
        national_id: "1710034064".to_string(),
        phone: "+593999123456".to_string(),
        email: "luis@correo.com".to_string(),
    };

    let report = form.validate();
    assert!(!report.can_submit);
    assert_eq!(report.errors.keys().copied().collect::<Vec<_>>(), vec![FormField::NationalId]);

    form.national_id = "1710034065".to_string();
    assert!(form.validate().can_submit);
}
