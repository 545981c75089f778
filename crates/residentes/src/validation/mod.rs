//! Input validation for resident records.
//!
//! [`validate_resident`] runs every field check in [`fields`] and either
//! returns a normalized [`NewResident`] or every problem it found, in field
//! order. A failing field never stops the remaining fields from being checked.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use residentes::resident::ResidentInput;
//! use residentes::validation::validate_resident;
//!
//! let input = ResidentInput {
//!     first_name: Some("  josé ".to_string()),
//!     last_name: Some("pérez".to_string()),
//!     birth_date: Some("1985-03-01".to_string()),
//!     passport: Some("ab-123456".to_string()),
//!     email: Some("jose@example.com".to_string()),
//!     ..Default::default()
//! };
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let resident = validate_resident(&input, today).unwrap();
//! assert_eq!(resident.first_name, "José");
//! assert_eq!(resident.passport, "AB-123456");
//! ```

pub mod fields;

use chrono::NaiveDate;
use serde::Serialize;

use crate::resident::{NewResident, ResidentInput};

/// A problem with a single submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the field, as it appears in request bodies.
    pub field: &'static str,
    /// Human-readable description of the problem.
    pub message: String,
}

/// Every field error found in one validation pass. Never empty when returned
/// as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Errors for a single field, e.g. an undecodable request body.
    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    fn push(&mut self, field: &'static str, message: String) {
        self.0.push(FieldError { field, message });
    }

    /// The collected errors, in field order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Whether no error was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Record the outcome of one field check, keeping the value on success.
fn check<T>(errors: &mut ValidationErrors, field: &'static str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(field, message);
            None
        }
    }
}

/// Validate and normalize a submitted resident.
///
/// `today` is the reference date for birth date checks.
///
/// # Errors
///
/// Returns every field error found; the list is never empty.
pub fn validate_resident(
    input: &ResidentInput,
    today: NaiveDate,
) -> Result<NewResident, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let first_name = check(&mut errors, "first_name", fields::name(input.first_name.as_deref()));
    let last_name = check(&mut errors, "last_name", fields::name(input.last_name.as_deref()));
    let birth_date = check(
        &mut errors,
        "birth_date",
        fields::birth_date(input.birth_date.as_deref(), today),
    );
    let passport = check(&mut errors, "passport", fields::passport(input.passport.as_deref()));
    let email = check(&mut errors, "email", fields::email(input.email.as_deref()));
    let phone = check(&mut errors, "phone", fields::phone(input.phone.as_deref()));
    let address = check(&mut errors, "address", fields::address(input.address.as_deref()));
    let occupation = check(
        &mut errors,
        "occupation",
        fields::occupation(input.occupation.as_deref()),
    );
    let marital_status = check(
        &mut errors,
        "marital_status",
        fields::marital_status(input.marital_status.as_deref()),
    );

    match (
        first_name,
        last_name,
        birth_date,
        passport,
        email,
        phone,
        address,
        occupation,
        marital_status,
    ) {
        (
            Some(first_name),
            Some(last_name),
            Some(birth_date),
            Some(passport),
            Some(email),
            Some(phone),
            Some(address),
            Some(occupation),
            Some(marital_status),
        ) if errors.is_empty() => Ok(NewResident {
            first_name,
            last_name,
            birth_date,
            passport,
            email,
            phone,
            address,
            occupation,
            marital_status,
        }),
        _ => Err(errors),
    }
}
