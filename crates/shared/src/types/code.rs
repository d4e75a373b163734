//! ISO currency and country codes.
//!
//! Both codes are stored as fixed-size uppercase ASCII so they are `Copy`
//! and cheap to use as map keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a valid ISO code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyCodeError {
    /// Wrong number of characters.
    #[error("Invalid code '{value}': expected {expected} letters")]
    InvalidLength {
        /// Offending input.
        value: String,
        /// Required length.
        expected: usize,
    },

    /// Contains something other than ASCII letters.
    #[error("Invalid code '{0}': only ASCII letters are allowed")]
    InvalidCharacter(String),
}

fn parse_letters<const N: usize>(s: &str) -> Result<[u8; N], CurrencyCodeError> {
    let trimmed = s.trim();
    if trimmed.len() != N {
        return Err(CurrencyCodeError::InvalidLength {
            value: s.to_string(),
            expected: N,
        });
    }

    let mut out = [0u8; N];
    for (slot, byte) in out.iter_mut().zip(trimmed.bytes()) {
        if !byte.is_ascii_alphabetic() {
            return Err(CurrencyCodeError::InvalidCharacter(s.to_string()));
        }
        *slot = byte.to_ascii_uppercase();
    }
    Ok(out)
}

fn letters_as_str(bytes: &[u8]) -> &str {
    // Only ASCII letters ever make it into the array.
    std::str::from_utf8(bytes).unwrap_or_default()
}

/// ISO 4217 currency code (e.g., "USD", "EUR").
///
/// Parsing is case-insensitive and normalizes to uppercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// US Dollar.
    pub const USD: Self = Self(*b"USD");
    /// Euro.
    pub const EUR: Self = Self(*b"EUR");
    /// Pound Sterling.
    pub const GBP: Self = Self(*b"GBP");

    /// Parses a currency code.
    pub fn parse(s: &str) -> Result<Self, CurrencyCodeError> {
        parse_letters::<3>(s).map(Self)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        letters_as_str(&self.0)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// ISO 3166-1 alpha-2 country code (e.g., "US", "PA").
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parses a country code.
    pub fn parse(s: &str) -> Result<Self, CurrencyCodeError> {
        parse_letters::<2>(s).map(Self)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        letters_as_str(&self.0)
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountryCode({})", self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("USD", "USD")]
    #[case("usd", "USD")]
    #[case(" eur ", "EUR")]
    #[case("GbP", "GBP")]
    fn test_currency_code_parse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::parse(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US")]
    #[case("USDX")]
    #[case("U$D")]
    #[case("12A")]
    fn test_currency_code_rejects_invalid(#[case] input: &str) {
        assert!(CurrencyCode::parse(input).is_err());
    }

    #[test]
    fn test_currency_code_constants() {
        assert_eq!(CurrencyCode::USD.to_string(), "USD");
        assert_eq!(CurrencyCode::EUR.to_string(), "EUR");
        assert_eq!(CurrencyCode::GBP.to_string(), "GBP");
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(code.as_str(), "JPY");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"JPY\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"YENS\"").is_err());
    }

    #[test]
    fn test_country_code_parse() {
        assert_eq!(CountryCode::parse("pa").unwrap().as_str(), "PA");
        assert!(CountryCode::parse("PAN").is_err());
        assert!(CountryCode::parse("P1").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = CurrencyCode::parse("AB").unwrap_err();
        assert_eq!(err.to_string(), "Invalid code 'AB': expected 3 letters");
    }
}
