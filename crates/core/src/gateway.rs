//! Payment gateway currency restrictions.

use std::collections::{BTreeMap, BTreeSet};

use currex_shared::CurrencyCode;

/// Which currencies each payment gateway accepts.
///
/// Gateways without an entry, or with an empty one, accept every currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayRestrictions {
    allowed: BTreeMap<String, BTreeSet<CurrencyCode>>,
}

impl GatewayRestrictions {
    /// Creates an empty set of restrictions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts `gateway` to `currencies`.
    pub fn restrict(
        &mut self,
        gateway: impl Into<String>,
        currencies: impl IntoIterator<Item = CurrencyCode>,
    ) {
        let currencies: BTreeSet<_> = currencies.into_iter().collect();
        let gateway = gateway.into();
        if currencies.is_empty() {
            self.allowed.remove(&gateway);
        } else {
            self.allowed.insert(gateway, currencies);
        }
    }

    /// Returns true if `gateway` may take payments in `currency`.
    #[must_use]
    pub fn is_allowed(&self, gateway: &str, currency: CurrencyCode) -> bool {
        self.allowed
            .get(gateway)
            .is_none_or(|currencies| currencies.contains(&currency))
    }

    /// Filters `candidates` down to the gateways accepting `currency`.
    pub fn allowed_gateways<'a>(
        &self,
        currency: CurrencyCode,
        candidates: impl IntoIterator<Item = &'a str>,
    ) -> Vec<&'a str> {
        candidates
            .into_iter()
            .filter(|gateway| self.is_allowed(gateway, currency))
            .collect()
    }

    /// Restricted gateways and their accepted currencies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<CurrencyCode>)> {
        self.allowed.iter().map(|(k, v)| (k.as_str(), v))
    }
}
