//! Country code types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;

/// A valid ISO-3166 alpha-2 country code.
///
/// Country codes are always 2 uppercase ASCII letters. This type guarantees
/// that any `CountryCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use route_cost::domain::CountryCode;
///
/// let fr = CountryCode::parse("FR").unwrap();
/// assert_eq!(fr.as_str(), "FR");
///
/// // Lowercase is rejected
/// assert!(CountryCode::parse("fr").is_err());
///
/// // Wrong length is rejected
/// assert!(CountryCode::parse("F").is_err());
/// assert!(CountryCode::parse("FRA").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Build a code from two ASCII bytes at compile time.
    ///
    /// Used by the static rule and price tables. Panics during constant
    /// evaluation if the bytes are not uppercase letters.
    pub const fn from_ascii(code: [u8; 2]) -> Self {
        assert!(
            code[0].is_ascii_uppercase() && code[1].is_ascii_uppercase(),
            "country code must be two uppercase ASCII letters"
        );
        Self(code)
    }

    /// Parse a country code from a string.
    ///
    /// The input must be exactly 2 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.as_bytes() {
            [a, b] if a.is_ascii_uppercase() && b.is_ascii_uppercase() => Ok(Self([*a, *b])),
            [_, _] => Err(ValidationError::InvalidCountryCode {
                code: s.to_string(),
                reason: "must be uppercase ASCII letters A-Z",
            }),
            _ => Err(ValidationError::InvalidCountryCode {
                code: s.to_string(),
                reason: "must be exactly 2 characters",
            }),
        }
    }

    /// Parse a country code, accepting lowercase and surrounding whitespace.
    pub fn parse_normalized(s: &str) -> Result<Self, ValidationError> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the country code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only uppercase ASCII is ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.as_str())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
