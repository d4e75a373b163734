//! Validated shop configuration.
//!
//! The admin-facing configuration is stringly typed. It is validated once
//! at startup into the types the rest of the crate works with.

pub mod error;

use std::collections::HashMap;

use currex_shared::{CountryCode, CurrencyCode, ShopConfig};
use tracing::warn;

pub use error::ConfigurationError;

use crate::currency::{CurrencyDisplaySettings, DisplaySettingsBook};
use crate::gateway::GatewayRestrictions;
use crate::session::{CountryCurrencyMap, ResolverPolicy, SessionCurrencyResolver};

/// Ordered set of currencies offered to visitors.
///
/// The base currency is always a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledCurrencySet {
    base: CurrencyCode,
    codes: Vec<CurrencyCode>,
}

impl EnabledCurrencySet {
    /// Builds the set, dropping duplicates and adding `base` first if missing.
    pub fn new(base: CurrencyCode, codes: impl IntoIterator<Item = CurrencyCode>) -> Self {
        let mut set = Self {
            base,
            codes: Vec::new(),
        };
        for code in codes {
            set.insert(code);
        }
        if !set.contains(base) {
            set.codes.insert(0, base);
        }
        set
    }

    /// Appends `code` if absent.
    pub fn insert(&mut self, code: CurrencyCode) {
        if !self.contains(code) {
            self.codes.push(code);
        }
    }

    /// Removes `code`. The base currency cannot be removed.
    ///
    /// Returns true if the set changed.
    pub fn remove(&mut self, code: CurrencyCode) -> bool {
        if code == self.base {
            return false;
        }
        let before = self.codes.len();
        self.codes.retain(|c| *c != code);
        self.codes.len() != before
    }

    /// Returns true if `code` is enabled.
    #[must_use]
    pub fn contains(&self, code: CurrencyCode) -> bool {
        self.codes.contains(&code)
    }

    /// Enabled codes in display order.
    #[must_use]
    pub fn as_slice(&self) -> &[CurrencyCode] {
        &self.codes
    }

    /// Number of enabled currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if no currency is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Shop currency settings after validation.
#[derive(Debug, Clone)]
pub struct ShopSettings {
    /// Base currency of the rate table.
    pub base: CurrencyCode,
    /// Currencies offered to visitors.
    pub enabled: EnabledCurrencySet,
    /// Default currency, if one is configured and enabled.
    pub default_currency: Option<CurrencyCode>,
    /// Detect from the visitor's country.
    pub auto_detect: bool,
    /// Re-detect auto-detected sessions.
    pub geo_redetect: bool,
    /// Display settings for each enabled currency.
    pub display: DisplaySettingsBook,
    /// Admin country overrides.
    pub country_overrides: HashMap<CountryCode, CurrencyCode>,
    /// Payment gateway restrictions.
    pub gateways: GatewayRestrictions,
}

fn currency(field: &'static str, raw: &str) -> Result<CurrencyCode, ConfigurationError> {
    CurrencyCode::parse(raw).map_err(|source| ConfigurationError::InvalidCurrency { field, source })
}

impl ShopSettings {
    /// Validates the admin configuration.
    pub fn from_config(config: &ShopConfig) -> Result<Self, ConfigurationError> {
        let base = currency("shop.base_currency", &config.base_currency)?;

        let codes = config
            .enabled_currencies
            .iter()
            .map(|raw| currency("shop.enabled_currencies", raw))
            .collect::<Result<Vec<_>, _>>()?;
        let enabled = EnabledCurrencySet::new(base, codes);

        let default_currency = match &config.default_currency {
            Some(raw) => {
                let code = currency("shop.default_currency", raw)?;
                if enabled.contains(code) {
                    Some(code)
                } else {
                    warn!(currency = %code, "Default currency is not enabled, ignoring it");
                    None
                }
            }
            None => None,
        };

        let mut display = DisplaySettingsBook::new();
        for code in enabled.as_slice() {
            display.enable(*code);
        }
        for (raw, display_config) in &config.display {
            let code = currency("shop.display", raw)?;
            let settings = CurrencyDisplaySettings::from_config(code, display_config).map_err(
                |source| ConfigurationError::Display {
                    currency: code.to_string(),
                    source,
                },
            )?;
            display.insert(settings);
        }

        let mut country_overrides = HashMap::new();
        for (raw_country, raw_currency) in &config.country_overrides {
            let country = CountryCode::parse(raw_country).map_err(|source| {
                ConfigurationError::InvalidCountry {
                    field: "shop.country_overrides",
                    source,
                }
            })?;
            country_overrides.insert(country, currency("shop.country_overrides", raw_currency)?);
        }

        let mut gateways = GatewayRestrictions::new();
        for (gateway, raw_codes) in &config.gateway_restrictions {
            let codes = raw_codes
                .iter()
                .map(|raw| currency("shop.gateway_restrictions", raw))
                .collect::<Result<Vec<_>, _>>()?;
            gateways.restrict(gateway.clone(), codes);
        }

        Ok(Self {
            base,
            enabled,
            default_currency,
            auto_detect: config.auto_detect,
            geo_redetect: config.geo_redetect,
            display,
            country_overrides,
            gateways,
        })
    }

    /// Resolution policy for the session resolver.
    #[must_use]
    pub fn resolver_policy(&self) -> ResolverPolicy {
        ResolverPolicy {
            base: self.base,
            enabled: self.enabled.as_slice().to_vec(),
            default_currency: self.default_currency,
            auto_detect: self.auto_detect,
            geo_redetect: self.geo_redetect,
        }
    }

    /// Session resolver over the bundled country mapping plus overrides.
    #[must_use]
    pub fn resolver(&self) -> SessionCurrencyResolver {
        SessionCurrencyResolver::new(
            self.resolver_policy(),
            CountryCurrencyMap::bundled().with_overrides(self.country_overrides.clone()),
        )
    }
}
