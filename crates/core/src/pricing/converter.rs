//! Price conversion between shop currencies.
//!
//! CRITICAL: Rounding strategy for charged amounts:
//! - Round to the target currency's decimal places
//! - Use banker's rounding (round half to even)
//! - Display formatting rounds separately, see `currency::display`

use std::sync::Arc;

use currex_shared::{CurrencyCode, Money};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

use super::overrides::{PriceOverrideSource, PriceTarget};
use crate::rates::RateService;

/// Converts amounts using the shared rate table.
#[derive(Clone)]
pub struct PriceConverter {
    rates: Arc<RateService>,
    base: CurrencyCode,
}

impl PriceConverter {
    /// Creates a converter whose default source currency is `base`.
    pub fn new(rates: Arc<RateService>, base: CurrencyCode) -> Self {
        Self { rates, base }
    }

    /// The shop's base currency.
    #[must_use]
    pub const fn base(&self) -> CurrencyCode {
        self.base
    }

    /// Converts `raw_price` from `from` to `to`.
    ///
    /// - negative amounts are not prices and pass through unchanged
    /// - an override wins over any rate math
    /// - same-currency conversion is the identity
    /// - a product too large for `Decimal` leaves the amount unconverted
    #[must_use]
    pub fn convert(
        &self,
        raw_price: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        override_price: Option<Decimal>,
    ) -> Decimal {
        if raw_price.is_sign_negative() && !raw_price.is_zero() {
            return raw_price;
        }
        if let Some(price) = override_price {
            return price;
        }
        if from == to {
            return raw_price;
        }
        let rate = self.rates.get_rate(from, to);
        raw_price.checked_mul(rate).unwrap_or_else(|| {
            warn!(
                from = %from,
                to = %to,
                amount = %raw_price,
                rate = %rate,
                "Converted amount overflows, returning it unconverted"
            );
            raw_price
        })
    }

    /// Converts a product or coupon price, honoring its fixed price in `to`.
    #[must_use]
    pub fn convert_item(
        &self,
        raw_price: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        target: PriceTarget,
        overrides: &dyn PriceOverrideSource,
    ) -> Decimal {
        self.convert(raw_price, from, to, overrides.price_for(target, to))
    }

    /// Converts a base-currency amount to `to`.
    #[must_use]
    pub fn convert_price(
        &self,
        amount: Decimal,
        to: CurrencyCode,
        override_price: Option<Decimal>,
    ) -> Decimal {
        self.convert(amount, self.base, to, override_price)
    }

    /// Converts `money` into `to`, keeping the currency alongside the amount.
    #[must_use]
    pub fn convert_money(
        &self,
        money: Money,
        to: CurrencyCode,
        override_price: Option<Decimal>,
    ) -> Money {
        if money.is_negative() {
            return money;
        }
        Money::new(self.convert(money.amount, money.currency, to, override_price), to)
    }

    /// Converts and rounds to `decimals` places with banker's rounding.
    #[must_use]
    pub fn convert_rounded(
        &self,
        raw_price: Decimal,
        from: CurrencyCode,
        to: CurrencyCode,
        override_price: Option<Decimal>,
        decimals: u32,
    ) -> Decimal {
        self.convert(raw_price, from, to, override_price)
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
    }
}
