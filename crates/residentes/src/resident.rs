//! Resident record types.
//!
//! Three shapes of the same record travel through the crate:
//!
//! - [`ResidentInput`] holds raw, untrusted values exactly as a client sent
//!   them (JSON body or HTML form).
//! - [`NewResident`] is the normalized payload produced by the validator and
//!   written by the repository.
//! - [`Resident`] is what the repository reads back. It is deliberately
//!   permissive: historical rows may not satisfy today's validation rules.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Civil status values accepted on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaritalStatus {
    /// Single (masculine).
    Soltero,
    /// Single (feminine).
    Soltera,
    /// Married (masculine).
    Casado,
    /// Married (feminine).
    Casada,
    /// Divorced (masculine).
    Divorciado,
    /// Divorced (feminine).
    Divorciada,
    /// Widowed (masculine).
    Viudo,
    /// Widowed (feminine).
    Viuda,
    /// Domestic partnership.
    #[serde(rename = "Unión Libre")]
    UnionLibre,
}

impl MaritalStatus {
    /// Every accepted value, in display order.
    pub const ALL: [Self; 9] = [
        Self::Soltero,
        Self::Soltera,
        Self::Casado,
        Self::Casada,
        Self::Divorciado,
        Self::Divorciada,
        Self::Viudo,
        Self::Viuda,
        Self::UnionLibre,
    ];

    /// The stored text for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soltero => "Soltero",
            Self::Soltera => "Soltera",
            Self::Casado => "Casado",
            Self::Casada => "Casada",
            Self::Divorciado => "Divorciado",
            Self::Divorciada => "Divorciada",
            Self::Viudo => "Viudo",
            Self::Viuda => "Viuda",
            Self::UnionLibre => "Unión Libre",
        }
    }

    /// Comma separated list of every accepted value.
    #[must_use]
    pub fn options() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a [`MaritalStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMaritalStatus(pub String);

impl FromStr for MaritalStatus {
    type Err = UnknownMaritalStatus;

    /// Exact match against the stored text. Callers normalize case first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownMaritalStatus(s.to_string()))
    }
}

/// Raw field values as submitted by a client.
///
/// Every field is optional text so that JSON bodies and form bodies decode
/// into the same shape and a missing field becomes a validation error rather
/// than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentInput {
    /// Given name(s).
    pub first_name: Option<String>,
    /// Family name(s).
    pub last_name: Option<String>,
    /// Birth date, expected as `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    /// Passport number in any case.
    pub passport: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Phone number, separators allowed.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Occupation or profession.
    pub occupation: Option<String>,
    /// Civil status in any case, e.g. `"soltera"`.
    pub marital_status: Option<String>,
}

impl From<&Resident> for ResidentInput {
    /// Pre-fill an edit form from a stored record.
    fn from(resident: &Resident) -> Self {
        Self {
            first_name: Some(resident.first_name.clone()),
            last_name: Some(resident.last_name.clone()),
            birth_date: Some(resident.birth_date.format("%Y-%m-%d").to_string()),
            passport: Some(resident.passport.clone()),
            email: Some(resident.email.clone()),
            phone: resident.phone.clone(),
            address: resident.address.clone(),
            occupation: resident.occupation.clone(),
            marital_status: resident.marital_status.clone(),
        }
    }
}

/// A validated and normalized resident, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewResident {
    /// Trimmed, title-cased given name(s).
    pub first_name: String,
    /// Trimmed, title-cased family name(s).
    pub last_name: String,
    /// Birth date, never in the future.
    pub birth_date: NaiveDate,
    /// Upper-cased passport number.
    pub passport: String,
    /// Trimmed email address.
    pub email: String,
    /// Phone number as typed, trimmed.
    pub phone: Option<String>,
    /// Trimmed postal address.
    pub address: Option<String>,
    /// Title-cased occupation.
    pub occupation: Option<String>,
    /// Civil status.
    pub marital_status: Option<MaritalStatus>,
}

impl NewResident {
    /// Attach a storage-assigned id.
    #[must_use]
    pub fn into_resident(self, id: i64) -> Resident {
        Resident {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            passport: self.passport,
            email: self.email,
            phone: self.phone,
            address: self.address,
            occupation: self.occupation,
            marital_status: self.marital_status.map(|s| s.as_str().to_string()),
        }
    }
}

/// A resident as read from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Given name(s).
    pub first_name: String,
    /// Family name(s).
    pub last_name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Passport number.
    pub passport: String,
    /// Contact email.
    pub email: String,
    /// Phone number, if recorded.
    pub phone: Option<String>,
    /// Postal address, if recorded.
    pub address: Option<String>,
    /// Occupation, if recorded.
    pub occupation: Option<String>,
    /// Civil status text; older rows may hold values outside
    /// [`MaritalStatus`].
    pub marital_status: Option<String>,
}

impl Resident {
    /// "First Last", as shown in listings.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
