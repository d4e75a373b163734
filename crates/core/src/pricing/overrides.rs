//! Admin-set fixed prices per currency.
//!
//! Overrides are owned by the shop's product and coupon entities. This
//! module only looks them up; it never computes one.

use currex_shared::{CouponId, CurrencyCode, ProductId};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Entity an override price belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PriceTarget {
    /// A product's regular price.
    Product(ProductId),
    /// A fixed-amount coupon.
    Coupon(CouponId),
}

/// Source of currency-specific fixed prices.
pub trait PriceOverrideSource: Send + Sync {
    /// Fixed price of `target` in `currency`, if the admin set one.
    fn price_for(&self, target: PriceTarget, currency: CurrencyCode) -> Option<Decimal>;
}

/// Override book kept in memory, safe for concurrent edits and lookups.
#[derive(Debug, Default)]
pub struct InMemoryPriceOverrides {
    prices: DashMap<(PriceTarget, CurrencyCode), Decimal>,
}

impl InMemoryPriceOverrides {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets or replaces a fixed price.
    pub fn set(&self, target: PriceTarget, currency: CurrencyCode, price: Decimal) {
        self.prices.insert((target, currency), price);
    }

    /// Removes a fixed price, returning it.
    pub fn remove(&self, target: PriceTarget, currency: CurrencyCode) -> Option<Decimal> {
        self.prices.remove(&(target, currency)).map(|(_, price)| price)
    }

    /// Number of stored overrides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Returns true if no override is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceOverrideSource for InMemoryPriceOverrides {
    fn price_for(&self, target: PriceTarget, currency: CurrencyCode) -> Option<Decimal> {
        self.prices.get(&(target, currency)).map(|price| *price)
    }
}
