//! Property-based tests for pairwise rates.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use currex_shared::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::FetchError;
use super::service::RateService;
use super::service::tests::StubFetcher;
use super::table::ExchangeRateTable;

const CODES: [&str; 6] = ["USD", "EUR", "GBP", "JPY", "CHF", "PAB"];

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate a populated table over `CODES` with a random base.
fn populated_table() -> impl Strategy<Value = ExchangeRateTable> {
    (0usize..CODES.len(), prop::collection::vec(positive_rate(), CODES.len())).prop_map(
        |(base_idx, rates)| {
            let base = CurrencyCode::parse(CODES[base_idx]).unwrap();
            let entries = CODES
                .iter()
                .zip(rates)
                .map(|(code, rate)| (CurrencyCode::parse(code).unwrap(), rate));
            ExchangeRateTable::new(base, entries, Utc::now())
        },
    )
}

fn any_code() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(CODES.to_vec()).prop_map(|c| CurrencyCode::parse(c).unwrap())
}

fn service_with(table: ExchangeRateTable) -> RateService {
    RateService::new(
        Arc::new(StubFetcher::failing(FetchError::MissingRates)),
        Duration::from_secs(15),
    )
    .with_table(table)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* currency, the rate to itself is exactly 1.
    #[test]
    fn prop_identity_rate_is_one(table in populated_table(), code in any_code()) {
        let service = service_with(table);
        prop_assert_eq!(service.get_rate(code, code), Decimal::ONE);
    }

    /// *For any* pair, going there and back multiplies to 1 within tolerance.
    #[test]
    fn prop_round_trip_is_consistent(
        table in populated_table(),
        a in any_code(),
        b in any_code(),
    ) {
        let service = service_with(table);
        let product = service.get_rate(a, b) * service.get_rate(b, a);
        prop_assert!(
            (product - Decimal::ONE).abs() < dec!(0.000000001),
            "rate({a},{b}) * rate({b},{a}) = {product}"
        );
    }

    /// *For any* table, the base's own rate is exactly 1.
    #[test]
    fn prop_base_rate_pinned(table in populated_table()) {
        prop_assert_eq!(table.rate(table.base()), Some(Decimal::ONE));
    }
}
