//! Consumer-facing price formatting.

use std::sync::Arc;

use currex_shared::CurrencyCode;
use rust_decimal::Decimal;

use crate::currency::{CurrencyDisplaySettings, CurrencyRegistry, DisplaySettingsBook, format_amount};

/// Formats amounts with each currency's symbol and display settings.
#[derive(Debug, Clone)]
pub struct PriceFormatter {
    registry: Arc<CurrencyRegistry>,
    display: Arc<DisplaySettingsBook>,
}

impl PriceFormatter {
    /// Creates a formatter over the given reference data.
    pub fn new(registry: Arc<CurrencyRegistry>, display: Arc<DisplaySettingsBook>) -> Self {
        Self { registry, display }
    }

    /// Display settings in force for `currency`.
    #[must_use]
    pub fn settings(&self, currency: CurrencyCode) -> CurrencyDisplaySettings {
        self.display.get(currency)
    }

    /// Decimal places prices in `currency` are shown and charged with.
    #[must_use]
    pub fn decimals(&self, currency: CurrencyCode) -> u32 {
        self.display.get(currency).decimals
    }

    /// Renders `amount` in `currency`, e.g. `$1,234.50`.
    #[must_use]
    pub fn format_price(&self, amount: Decimal, currency: CurrencyCode) -> String {
        format_amount(
            amount,
            &self.display.get(currency),
            &self.registry.symbol(currency),
        )
    }
}
