//! Currency reference data.
//!
//! The registry is loaded once at startup and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use currex_shared::CurrencyCode;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::error::RegistryError;

const BUNDLED_DATASET: &str = include_str!("data/currencies.json");

static BUNDLED: Lazy<CurrencyRegistry> = Lazy::new(|| {
    CurrencyRegistry::from_json(BUNDLED_DATASET).unwrap_or_else(|e| {
        error!(error = %e, "Bundled currency dataset is unusable, using minimal set");
        CurrencyRegistry::minimal()
    })
});

/// A supported currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// ISO 4217 code.
    pub code: CurrencyCode,
    /// Human readable name.
    pub name: String,
    /// Display symbol.
    pub symbol: String,
    /// Lowercase country code used for flag lookup.
    pub country_code: Option<String>,
}

/// Dataset entry as stored on disk.
#[derive(Debug, Deserialize)]
struct CurrencyRecord {
    name: String,
    symbol: String,
    #[serde(default)]
    country_code: Option<String>,
}

/// Immutable collection of supported currencies keyed by code.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    currencies: BTreeMap<CurrencyCode, Currency>,
}

impl CurrencyRegistry {
    /// Parses a dataset of the form `{ "USD": {"name": .., "symbol": .., "country_code": ..} }`.
    ///
    /// Entries with an invalid code are skipped.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let records: BTreeMap<String, CurrencyRecord> = serde_json::from_str(json)?;

        let mut currencies = BTreeMap::new();
        for (raw_code, record) in records {
            let Ok(code) = CurrencyCode::parse(&raw_code) else {
                warn!(code = %raw_code, "Skipping invalid currency code in dataset");
                continue;
            };
            currencies.insert(
                code,
                Currency {
                    code,
                    name: record.name,
                    symbol: record.symbol,
                    country_code: record.country_code.map(|c| c.to_ascii_lowercase()),
                },
            );
        }

        if currencies.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self { currencies })
    }

    /// The dataset compiled into the binary.
    #[must_use]
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }

    /// Last-resort dataset with USD, EUR and GBP.
    #[must_use]
    pub fn minimal() -> Self {
        let entries = [
            (CurrencyCode::USD, "US Dollar", "$", Some("us")),
            (CurrencyCode::EUR, "Euro", "€", Some("eu")),
            (CurrencyCode::GBP, "Pound Sterling", "£", Some("gb")),
        ];

        let currencies = entries
            .into_iter()
            .map(|(code, name, symbol, country)| {
                (
                    code,
                    Currency {
                        code,
                        name: name.to_string(),
                        symbol: symbol.to_string(),
                        country_code: country.map(str::to_string),
                    },
                )
            })
            .collect();

        Self { currencies }
    }

    /// Loads the dataset from `path`, or the bundled one when no path is given.
    ///
    /// A missing or malformed file degrades to [`CurrencyRegistry::minimal`].
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::bundled();
        };

        match std::fs::read_to_string(path)
            .map_err(RegistryError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(registry) => registry,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Currency dataset unavailable, using minimal set");
                Self::minimal()
            }
        }
    }

    /// Looks up a currency.
    #[must_use]
    pub fn get(&self, code: CurrencyCode) -> Option<&Currency> {
        self.currencies.get(&code)
    }

    /// Returns true if the code is known.
    #[must_use]
    pub fn contains(&self, code: CurrencyCode) -> bool {
        self.currencies.contains_key(&code)
    }

    /// Display symbol for a code, or the code itself when unknown.
    #[must_use]
    pub fn symbol(&self, code: CurrencyCode) -> String {
        self.get(code)
            .map_or_else(|| code.to_string(), |c| c.symbol.clone())
    }

    /// All currencies ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }

    /// Number of known currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Returns true if the registry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_dataset_loads() {
        let registry = CurrencyRegistry::bundled();
        assert!(registry.len() > 40);
        let usd = registry.get(CurrencyCode::USD).unwrap();
        assert_eq!(usd.name, "US Dollar");
        assert_eq!(usd.symbol, "$");
        assert_eq!(usd.country_code.as_deref(), Some("us"));
        assert!(registry.contains(CurrencyCode::parse("PAB").unwrap()));
    }

    #[test]
    fn test_from_json_skips_invalid_codes() {
        let registry = CurrencyRegistry::from_json(
            r#"{"usd": {"name": "US Dollar", "symbol": "$"}, "DOLLAR": {"name": "x", "symbol": "x"}}"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(CurrencyCode::USD));
        assert!(registry.get(CurrencyCode::USD).unwrap().country_code.is_none());
    }

    #[test]
    fn test_from_json_rejects_empty_and_malformed() {
        assert!(matches!(
            CurrencyRegistry::from_json("{}"),
            Err(RegistryError::Empty)
        ));
        assert!(matches!(
            CurrencyRegistry::from_json("[1, 2]"),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_falls_back_to_minimal() {
        let registry = CurrencyRegistry::load(Some(Path::new("/nonexistent/currencies.json")));
        assert_eq!(registry.len(), 3);
        assert!(registry.contains(CurrencyCode::USD));
        assert!(registry.contains(CurrencyCode::EUR));
        assert!(registry.contains(CurrencyCode::GBP));
    }

    #[test]
    fn test_load_without_path_uses_bundled() {
        assert_eq!(CurrencyRegistry::load(None).len(), CurrencyRegistry::bundled().len());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"CHF": {{"name": "Swiss Franc", "symbol": "CHF", "country_code": "CH"}}}}"#
        )
        .unwrap();

        let registry = CurrencyRegistry::load(Some(file.path()));
        assert_eq!(registry.len(), 1);
        let chf = registry.get(CurrencyCode::parse("CHF").unwrap()).unwrap();
        assert_eq!(chf.country_code.as_deref(), Some("ch"));
    }

    #[test]
    fn test_symbol_falls_back_to_code() {
        let registry = CurrencyRegistry::minimal();
        assert_eq!(registry.symbol(CurrencyCode::GBP), "£");
        assert_eq!(registry.symbol(CurrencyCode::parse("JPY").unwrap()), "JPY");
    }
}
