//! Airport identity and the operational record produced for it

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::constants::{code, contact};
use crate::infrastructure::aip_error::{AipError, AipResult};

/// Validated ICAO-style location indicator
///
/// Always upper case, 3 or 4 ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    pub fn parse(raw: &str) -> AipResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AipError::invalid_airport_code(raw, "code is empty"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AipError::invalid_airport_code(
                raw,
                "code must contain only letters and digits",
            ));
        }
        if trimmed.len() < code::MIN_LEN || trimmed.len() > code::MAX_LEN {
            return Err(AipError::invalid_airport_code(
                raw,
                &format!(
                    "code must be {} to {} characters long",
                    code::MIN_LEN,
                    code::MAX_LEN
                ),
            ));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters, or the whole code if it is shorter
    pub fn leading(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl TryFrom<String> for AirportCode {
    type Error = AipError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

impl AsRef<str> for AirportCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One contact entry from the operator block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type")]
    pub contact_type: String,
    pub phone: String,
    pub name: String,
    pub email: String,
    pub notes: String,
}

impl Contact {
    /// Entry reported when the page lists no phone or email at all
    pub fn placeholder() -> Self {
        Self {
            contact_type: contact::OPERATOR_TYPE.to_string(),
            phone: String::new(),
            name: String::new(),
            email: String::new(),
            notes: contact::UNAVAILABLE_NOTES.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.phone.is_empty() && self.email.is_empty()
    }
}

/// Fixed-shape result of a lookup. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportRecord {
    pub airport_code: String,
    pub airport_name: String,
    pub ad_administration: String,
    pub ad_operator: String,
    pub customs_and_immigration: String,
    pub ats: String,
    pub operational_remarks: String,
    pub traffic_types: String,
    pub administrative_remarks: String,
    pub fire_fighting_category: String,
    pub contacts: Vec<Contact>,
}
