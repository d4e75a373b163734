//! Property-based tests for price conversion and formatting.

use std::sync::Arc;

use currex_shared::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::converter::PriceConverter;
use crate::currency::{CurrencyDisplaySettings, SymbolPosition, format_amount};
use crate::rates::service::tests::scenario_service;

const CODES: [&str; 4] = ["USD", "EUR", "GBP", "JPY"];

/// Strategy to generate non-negative prices (0.00 to 1,000,000.00).
fn price() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn any_code() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(CODES.to_vec()).prop_map(|c| CurrencyCode::parse(c).unwrap())
}

fn any_position() -> impl Strategy<Value = SymbolPosition> {
    prop_oneof![
        Just(SymbolPosition::Left),
        Just(SymbolPosition::Right),
        Just(SymbolPosition::LeftSpace),
        Just(SymbolPosition::RightSpace),
    ]
}

fn converter() -> PriceConverter {
    PriceConverter::new(Arc::new(scenario_service()), CurrencyCode::USD)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* price and currency, converting to the same currency is the identity.
    #[test]
    fn prop_same_currency_is_identity(raw in price(), code in any_code()) {
        prop_assert_eq!(converter().convert(raw, code, code, None), raw);
    }

    /// *For any* inputs, a present override is returned verbatim.
    #[test]
    fn prop_override_always_wins(
        raw in price(),
        fixed in price(),
        from in any_code(),
        to in any_code(),
    ) {
        prop_assert_eq!(converter().convert(raw, from, to, Some(fixed)), fixed);
    }

    /// *For any* amount and settings, formatting twice yields the same string.
    #[test]
    fn prop_format_is_deterministic(
        cents in -100_000_000i64..100_000_000i64,
        decimals in 0u32..5,
        position in any_position(),
    ) {
        let amount = Decimal::new(cents, 3);
        let settings = CurrencyDisplaySettings::new(CurrencyCode::USD)
            .with_position(position)
            .with_decimals(decimals);
        prop_assert_eq!(
            format_amount(amount, &settings, "$"),
            format_amount(amount, &settings, "$")
        );
    }

    /// *For any* amount, the formatted digits are the amount rounded to the display decimals.
    #[test]
    fn prop_format_preserves_rounded_value(cents in 0i64..100_000_000i64, decimals in 0u32..4) {
        let amount = Decimal::new(cents, 3);
        let settings = CurrencyDisplaySettings::new(CurrencyCode::USD)
            .with_decimals(decimals)
            .with_separators("", ".");
        let formatted = format_amount(amount, &settings, "");
        let parsed: Decimal = formatted.parse().unwrap();
        prop_assert_eq!(
            parsed,
            amount.round_dp_with_strategy(decimals, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        );
    }
}
