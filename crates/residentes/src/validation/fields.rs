//! Per-field normalization and checks.
//!
//! Each function trims its input, applies the field's rules in order and
//! returns either the normalized value or the message for the first rule that
//! failed.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::resident::MaritalStatus;

/// Longest allowed name, in characters.
pub const NAME_MAX_CHARS: usize = 100;
/// Shortest allowed name, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Shortest allowed passport number, in characters.
pub const PASSPORT_MIN_CHARS: usize = 6;
/// Longest allowed passport number, in characters.
pub const PASSPORT_MAX_CHARS: usize = 50;
/// Longest allowed email, in characters.
pub const EMAIL_MAX_CHARS: usize = 150;
/// Longest allowed address, in characters.
pub const ADDRESS_MAX_CHARS: usize = 255;
/// Longest allowed occupation, in characters.
pub const OCCUPATION_MAX_CHARS: usize = 100;
/// Oldest accepted age, measured in 365-day years.
pub const MAX_AGE_YEARS: i64 = 150;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    // Patterns are literals below; a failure here is a programming error.
    cell.get_or_init(|| Regex::new(pattern).expect("invalid built-in pattern"))
}

fn name_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s]+$")
}

fn passport_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"^[A-Z0-9\-]+$")
}

fn email_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
}

fn phone_separators() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"[\s\-\(\)]")
}

fn phone_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"^\+?\d{7,15}$")
}

fn occupation_pattern() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    regex(&CELL, r"^[a-zA-ZáéíóúÁÉÍÓÚñÑüÜ\s\.\-]+$")
}

/// Upper-case every letter that starts a word and lower-case the rest.
///
/// A word starts at the beginning of the text or after any non-letter, so
/// `"ing. civil-mecánico"` becomes `"Ing. Civil-Mecánico"`.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

/// Trim optional text, mapping blank or absent input to `None`.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// First or last name.
///
/// # Errors
///
/// Returns the message for the first violated rule.
pub fn name(value: Option<&str>) -> Result<String, String> {
    let Some(value) = non_blank(value) else {
        return Err("El campo no puede estar vacío".to_string());
    };
    let len = value.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(format!("Debe tener al menos {NAME_MIN_CHARS} caracteres"));
    }
    if len > NAME_MAX_CHARS {
        return Err(format!("No puede exceder {NAME_MAX_CHARS} caracteres"));
    }
    if !name_pattern().is_match(value) {
        return Err("Solo se permiten letras y espacios".to_string());
    }
    Ok(title_case(value))
}

/// Birth date in ISO-8601 form, checked against `today`.
///
/// Age is approximated as whole days divided by 365.
///
/// # Errors
///
/// Returns the message for the first violated rule.
pub fn birth_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, String> {
    let Some(value) = non_blank(value) else {
        return Err("La fecha de nacimiento es obligatoria".to_string());
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Fecha inválida, use el formato AAAA-MM-DD".to_string())?;
    if date > today {
        return Err("La fecha de nacimiento no puede ser futura".to_string());
    }
    if (today - date).num_days() / 365 > MAX_AGE_YEARS {
        return Err("La fecha de nacimiento no es válida".to_string());
    }
    Ok(date)
}

/// Passport number, stored upper-cased.
///
/// # Errors
///
/// Returns the message for the first violated rule.
pub fn passport(value: Option<&str>) -> Result<String, String> {
    let Some(value) = non_blank(value) else {
        return Err("El pasaporte es obligatorio".to_string());
    };
    let value = value.to_uppercase();
    let len = value.chars().count();
    if len < PASSPORT_MIN_CHARS {
        return Err(format!(
            "El pasaporte debe tener al menos {PASSPORT_MIN_CHARS} caracteres"
        ));
    }
    if len > PASSPORT_MAX_CHARS {
        return Err(format!(
            "El pasaporte no puede exceder {PASSPORT_MAX_CHARS} caracteres"
        ));
    }
    if !passport_pattern().is_match(&value) {
        return Err("El pasaporte solo puede contener letras, números y guiones".to_string());
    }
    Ok(value)
}

/// Email address. The shape check is intentionally looser than RFC 5322.
///
/// # Errors
///
/// Returns the message for the first violated rule.
pub fn email(value: Option<&str>) -> Result<String, String> {
    let Some(value) = non_blank(value) else {
        return Err("El email es obligatorio".to_string());
    };
    if value.chars().count() > EMAIL_MAX_CHARS {
        return Err(format!(
            "El email no puede exceder {EMAIL_MAX_CHARS} caracteres"
        ));
    }
    if !email_pattern().is_match(value) {
        return Err("Formato de email inválido".to_string());
    }
    Ok(value.to_string())
}

/// Optional phone number.
///
/// Separators are only ignored for the check; the trimmed text as typed is
/// what gets stored.
///
/// # Errors
///
/// Returns a message when the digits do not form a 7 to 15 digit number.
pub fn phone(value: Option<&str>) -> Result<Option<String>, String> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    let digits = phone_separators().replace_all(value, "");
    if !phone_pattern().is_match(&digits) {
        return Err(
            "Formato de teléfono inválido. Debe contener entre 7 y 15 dígitos".to_string(),
        );
    }
    Ok(Some(value.to_string()))
}

/// Optional postal address.
///
/// # Errors
///
/// Returns a message when the address is too long.
pub fn address(value: Option<&str>) -> Result<Option<String>, String> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    if value.chars().count() > ADDRESS_MAX_CHARS {
        return Err(format!(
            "La dirección no puede exceder {ADDRESS_MAX_CHARS} caracteres"
        ));
    }
    Ok(Some(value.to_string()))
}

/// Optional occupation, stored title-cased.
///
/// # Errors
///
/// Returns the message for the first violated rule.
pub fn occupation(value: Option<&str>) -> Result<Option<String>, String> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    if value.chars().count() > OCCUPATION_MAX_CHARS {
        return Err(format!(
            "La ocupación no puede exceder {OCCUPATION_MAX_CHARS} caracteres"
        ));
    }
    if !occupation_pattern().is_match(value) {
        return Err(
            "La ocupación solo puede contener letras, espacios, puntos y guiones".to_string(),
        );
    }
    Ok(Some(title_case(value)))
}

/// Optional civil status, matched after title-casing.
///
/// # Errors
///
/// Returns a message listing every accepted value.
pub fn marital_status(value: Option<&str>) -> Result<Option<MaritalStatus>, String> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    title_case(value)
        .parse::<MaritalStatus>()
        .map(Some)
        .map_err(|_| {
            format!(
                "Estado civil inválido. Opciones válidas: {}",
                MaritalStatus::options()
            )
        })
}
