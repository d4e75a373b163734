//! Property-based tests for currency resolution.

use currex_shared::{CountryCode, CurrencyCode};
use proptest::prelude::*;

use super::geo::CountryCurrencyMap;
use super::resolver::{RequestSignals, ResolverPolicy, SessionCurrencyResolver};
use super::state::SessionCurrencyState;

const CODES: [&str; 6] = ["USD", "EUR", "GBP", "JPY", "PAB", "CHF"];
const COUNTRIES: [&str; 6] = ["US", "PA", "GB", "DE", "JP", "CH"];

fn any_code() -> impl Strategy<Value = CurrencyCode> {
    prop::sample::select(CODES.to_vec()).prop_map(|c| CurrencyCode::parse(c).unwrap())
}

/// Raw signal text: valid codes, cookie encodings and junk.
fn raw_signal() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        prop::sample::select(CODES.to_vec()).prop_map(|c| c.to_string()),
        prop::sample::select(CODES.to_vec()).prop_map(|c| format!("{c}:auto")),
        prop::sample::select(CODES.to_vec()).prop_map(|c| format!("{}:explicit", c.to_lowercase())),
        "\\PC{0,12}",
    ])
}

fn any_state() -> impl Strategy<Value = Option<SessionCurrencyState>> {
    prop::option::of((any_code(), any::<bool>()).prop_map(|(code, explicit)| {
        if explicit {
            SessionCurrencyState::explicit(code)
        } else {
            SessionCurrencyState::auto(code)
        }
    }))
}

fn any_signals() -> impl Strategy<Value = RequestSignals> {
    (
        raw_signal(),
        any_state(),
        raw_signal(),
        prop::option::of(prop::sample::select(COUNTRIES.to_vec())),
    )
        .prop_map(|(requested, session, cookie, country)| RequestSignals {
            requested,
            session,
            cookie,
            country: country.map(|c| CountryCode::parse(c).unwrap()),
        })
}

fn any_policy() -> impl Strategy<Value = ResolverPolicy> {
    (
        prop::sample::subsequence(CODES.to_vec(), 0..CODES.len()),
        prop::option::of(any_code()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(enabled, default_currency, auto_detect, geo_redetect)| {
            let mut enabled: Vec<_> = enabled
                .into_iter()
                .map(|c| CurrencyCode::parse(c).unwrap())
                .collect();
            if !enabled.contains(&CurrencyCode::USD) {
                enabled.insert(0, CurrencyCode::USD);
            }
            ResolverPolicy {
                base: CurrencyCode::USD,
                enabled,
                default_currency,
                auto_detect,
                geo_redetect,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* signals, the resolved currency is enabled.
    #[test]
    fn prop_resolution_is_always_enabled(policy in any_policy(), signals in any_signals()) {
        let resolver = SessionCurrencyResolver::new(policy.clone(), CountryCurrencyMap::bundled());
        let resolution = resolver.resolve(&signals);
        prop_assert!(policy.enabled.contains(&resolution.currency));
        prop_assert_eq!(resolution.currency, resolution.state.currency);
    }

    /// *For any* signals without a request parameter, an enabled explicit session is kept.
    #[test]
    fn prop_explicit_session_is_terminal(
        policy in any_policy(),
        mut signals in any_signals(),
        index in any::<prop::sample::Index>(),
    ) {
        let chosen = *index.get(&policy.enabled);
        signals.requested = None;
        signals.session = Some(SessionCurrencyState::explicit(chosen));

        let resolver = SessionCurrencyResolver::new(policy, CountryCurrencyMap::bundled());
        let resolution = resolver.resolve(&signals);
        prop_assert_eq!(resolution.state, SessionCurrencyState::explicit(chosen));
        prop_assert!(!resolution.changed);
    }
}
