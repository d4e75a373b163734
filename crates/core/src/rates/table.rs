//! Base-relative exchange rate table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use currex_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Rates as returned by a provider, keyed by the provider's currency strings.
pub type RawRateMap = BTreeMap<String, Decimal>;

/// Units of each currency per one unit of `base`.
///
/// The base currency is always present at exactly 1. Tables are replaced
/// wholesale on refresh and never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TableSnapshot")]
pub struct ExchangeRateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
    last_updated: DateTime<Utc>,
}

/// Serialized shape; goes back through [`ExchangeRateTable::new`] on load.
#[derive(Deserialize)]
struct TableSnapshot {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, Decimal>,
    last_updated: DateTime<Utc>,
}

impl From<TableSnapshot> for ExchangeRateTable {
    fn from(snapshot: TableSnapshot) -> Self {
        Self::new(snapshot.base, snapshot.rates, snapshot.last_updated)
    }
}

impl ExchangeRateTable {
    /// Builds a table, dropping non-positive rates and pinning the base at 1.
    pub fn new(
        base: CurrencyCode,
        rates: impl IntoIterator<Item = (CurrencyCode, Decimal)>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let mut table: BTreeMap<CurrencyCode, Decimal> = rates
            .into_iter()
            .filter(|(code, rate)| {
                let usable = *rate > Decimal::ZERO;
                if !usable {
                    warn!(currency = %code, rate = %rate, "Dropping non-positive exchange rate");
                }
                usable
            })
            .collect();

        match table.get(&base) {
            Some(rate) if *rate != Decimal::ONE => {
                warn!(base = %base, rate = %rate, "Provider reported a base rate other than 1, overriding");
            }
            Some(_) => {}
            None => warn!(base = %base, "Provider table has no base rate, pinning it at 1"),
        }
        table.insert(base, Decimal::ONE);

        Self {
            base,
            rates: table,
            last_updated,
        }
    }

    /// Builds a table from provider output, skipping unparseable codes.
    pub fn from_raw(base: CurrencyCode, raw: RawRateMap, last_updated: DateTime<Utc>) -> Self {
        let parsed = raw.into_iter().filter_map(|(code, rate)| {
            CurrencyCode::parse(&code)
                .inspect_err(|_| warn!(code = %code, "Skipping unknown currency code from provider"))
                .ok()
                .map(|code| (code, rate))
        });
        Self::new(base, parsed, last_updated)
    }

    /// Currency every rate is relative to.
    #[must_use]
    pub const fn base(&self) -> CurrencyCode {
        self.base
    }

    /// Rate for `code`, if present.
    #[must_use]
    pub fn rate(&self, code: CurrencyCode) -> Option<Decimal> {
        self.rates.get(&code).copied()
    }

    /// All rates ordered by code.
    #[must_use]
    pub const fn rates(&self) -> &BTreeMap<CurrencyCode, Decimal> {
        &self.rates
    }

    /// When the table was fetched.
    #[must_use]
    pub const fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Number of entries, base included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Always false: the base entry is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
