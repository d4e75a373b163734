//! Country to currency mapping and visitor geolocation.

use std::collections::{BTreeMap, HashMap};

use currex_shared::{CountryCode, CurrencyCode};
use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::currency::RegistryError;

const BUNDLED_MAPPING: &str = include_str!("data/country_currencies.json");

static BUNDLED: Lazy<HashMap<CountryCode, Vec<CurrencyCode>>> = Lazy::new(|| {
    parse_mapping(BUNDLED_MAPPING).unwrap_or_else(|e| {
        error!(error = %e, "Bundled country mapping is unusable, geolocation disabled");
        HashMap::new()
    })
});

fn parse_mapping(json: &str) -> Result<HashMap<CountryCode, Vec<CurrencyCode>>, RegistryError> {
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;

    Ok(raw
        .into_iter()
        .filter_map(|(country, currencies)| {
            let country = CountryCode::parse(&country).ok()?;
            let currencies = currencies
                .iter()
                .filter_map(|c| CurrencyCode::parse(c).ok())
                .collect::<Vec<_>>();
            (!currencies.is_empty()).then_some((country, currencies))
        })
        .collect())
}

/// Candidate currencies per country.
///
/// A country may map to several currencies. An admin override for a
/// country is tried before the static candidates.
#[derive(Debug, Clone)]
pub struct CountryCurrencyMap {
    defaults: HashMap<CountryCode, Vec<CurrencyCode>>,
    overrides: HashMap<CountryCode, CurrencyCode>,
}

impl CountryCurrencyMap {
    /// The embedded static mapping with no overrides.
    #[must_use]
    pub fn bundled() -> Self {
        Self {
            defaults: BUNDLED.clone(),
            overrides: HashMap::new(),
        }
    }

    /// Parses a mapping of the form `{ "PA": ["PAB", "USD"] }`.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(Self {
            defaults: parse_mapping(json)?,
            overrides: HashMap::new(),
        })
    }

    /// Adds admin overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: HashMap<CountryCode, CurrencyCode>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Candidates for `country` in preference order.
    pub fn candidates(&self, country: CountryCode) -> impl Iterator<Item = CurrencyCode> + '_ {
        let defaults = self.defaults.get(&country).map_or(&[][..], Vec::as_slice);
        self.overrides
            .get(&country)
            .copied()
            .into_iter()
            .chain(defaults.iter().copied())
    }

    /// First candidate for `country` accepted by `is_enabled`.
    pub fn currency_for(
        &self,
        country: CountryCode,
        is_enabled: impl Fn(CurrencyCode) -> bool,
    ) -> Option<CurrencyCode> {
        self.candidates(country).find(|c| is_enabled(*c))
    }
}

impl Default for CountryCurrencyMap {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Read access to request headers.
pub trait HeaderLookup {
    /// Value of header `name`, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;
}

impl HeaderLookup for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Derives the visitor's country from a request.
pub trait GeoLocator: Send + Sync {
    /// The visitor's country, if it can be told.
    fn locate(&self, headers: &dyn HeaderLookup) -> Option<CountryCode>;
}

/// Reads the country from a header set by an edge proxy (e.g. `CF-IPCountry`).
#[derive(Debug, Clone)]
pub struct HeaderGeoLocator {
    header: String,
}

impl HeaderGeoLocator {
    /// Creates a locator reading `header`.
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl GeoLocator for HeaderGeoLocator {
    fn locate(&self, headers: &dyn HeaderLookup) -> Option<CountryCode> {
        let raw = headers.header(&self.header)?;
        match CountryCode::parse(raw) {
            Ok(country) => Some(country),
            Err(e) => {
                debug!(header = %self.header, error = %e, "Ignoring unusable country header");
                None
            }
        }
    }
}
