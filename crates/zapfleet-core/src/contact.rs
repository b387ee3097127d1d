//! Message recipients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Network suffix appended to every qualified phone number.
pub const WIRE_SUFFIX: &str = "@c.us";

/// A recipient qualified for the wire: country-code-prefixed number plus
/// the network suffix, e.g. `5511999990000@c.us`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    phone: String,
}

impl Contact {
    /// Wrap an already-qualified phone identifier.
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
        }
    }

    /// Qualify a raw spreadsheet cell: keep the digits, prefix the country
    /// code, append the network suffix.
    ///
    /// Returns `None` when the cell holds no digits at all — such rows
    /// produce no contact.
    pub fn from_raw(raw: &str, country_code: &str) -> Option<Self> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        Some(Self {
            phone: format!("{country_code}{digits}{WIRE_SUFFIX}"),
        })
    }

    /// The qualified phone identifier.
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phone)
    }
}
