//! Active-currency resolution for a request.
//!
//! Precedence, highest first:
//! 1. explicit request parameter
//! 2. session-stored currency
//! 3. cookie-stored currency (promoted into the session)
//! 4. visitor country, when auto-detection is on
//! 5. configured default currency
//! 6. base currency

use std::sync::atomic::{AtomicBool, Ordering};

use currex_shared::{CountryCode, CurrencyCode};
use serde::Serialize;
use tracing::{debug, error};

use super::geo::CountryCurrencyMap;
use super::state::SessionCurrencyState;

/// Everything a request says about the visitor's currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// Raw currency request parameter.
    pub requested: Option<String>,
    /// State already held by the session.
    pub session: Option<SessionCurrencyState>,
    /// Raw cookie value.
    pub cookie: Option<String>,
    /// Visitor country from geolocation.
    pub country: Option<CountryCode>,
}

/// Outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Currency governing the request.
    pub currency: CurrencyCode,
    /// State to store for the session.
    pub state: SessionCurrencyState,
    /// True if `state` differs from the session's and must be persisted.
    pub changed: bool,
}

/// Shop policy the resolver applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// Shop base currency.
    pub base: CurrencyCode,
    /// Enabled currencies in display order.
    pub enabled: Vec<CurrencyCode>,
    /// Configured default currency.
    pub default_currency: Option<CurrencyCode>,
    /// Detect from the visitor's country on first visit.
    pub auto_detect: bool,
    /// Re-detect auto-detected sessions on every request.
    pub geo_redetect: bool,
}

impl ResolverPolicy {
    /// Policy with only `base` enabled and detection off.
    #[must_use]
    pub fn base_only(base: CurrencyCode) -> Self {
        Self {
            base,
            enabled: vec![base],
            default_currency: None,
            auto_detect: false,
            geo_redetect: false,
        }
    }
}

/// Decides the active currency from explicit request signals.
#[derive(Debug)]
pub struct SessionCurrencyResolver {
    policy: ResolverPolicy,
    countries: CountryCurrencyMap,
    empty_set_reported: AtomicBool,
}

impl SessionCurrencyResolver {
    /// Creates a resolver.
    pub fn new(policy: ResolverPolicy, countries: CountryCurrencyMap) -> Self {
        Self {
            policy,
            countries,
            empty_set_reported: AtomicBool::new(false),
        }
    }

    /// The policy in force.
    #[must_use]
    pub const fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    /// Returns true if `code` is an enabled currency.
    #[must_use]
    pub fn is_enabled(&self, code: CurrencyCode) -> bool {
        self.policy.enabled.contains(&code)
    }

    /// Resolves the active currency. Never fails.
    ///
    /// The returned currency is always enabled, except when the enabled
    /// set is empty; then the base currency is returned.
    pub fn resolve(&self, signals: &RequestSignals) -> Resolution {
        if self.policy.enabled.is_empty() {
            self.report_empty_set();
            return Self::finish(SessionCurrencyState::explicit(self.policy.base), signals);
        }

        if let Some(currency) = self.enabled_code(signals.requested.as_deref(), "request") {
            return Self::finish(SessionCurrencyState::explicit(currency), signals);
        }

        let stored = signals
            .session
            .filter(|state| self.is_enabled(state.currency))
            .or_else(|| self.cookie_state(signals.cookie.as_deref()));

        let state = match stored {
            Some(state) => self.redetect(state, signals.country),
            None => self.first_visit(signals.country),
        };
        Self::finish(state, signals)
    }

    fn finish(state: SessionCurrencyState, signals: &RequestSignals) -> Resolution {
        Resolution {
            currency: state.currency,
            state,
            changed: signals.session != Some(state),
        }
    }

    fn enabled_code(&self, raw: Option<&str>, source: &'static str) -> Option<CurrencyCode> {
        let raw = raw?;
        match CurrencyCode::parse(raw) {
            Ok(code) if self.is_enabled(code) => Some(code),
            Ok(code) => {
                debug!(source, currency = %code, "Ignoring currency that is not enabled");
                None
            }
            Err(e) => {
                debug!(source, error = %e, "Ignoring invalid currency code");
                None
            }
        }
    }

    fn cookie_state(&self, raw: Option<&str>) -> Option<SessionCurrencyState> {
        let state = SessionCurrencyState::parse_cookie(raw?);
        if state.is_none() {
            debug!("Ignoring malformed currency cookie");
        }
        state.filter(|s| self.is_enabled(s.currency))
    }

    fn geo_currency(&self, country: Option<CountryCode>) -> Option<CurrencyCode> {
        self.countries
            .currency_for(country?, |code| self.is_enabled(code))
    }

    fn redetect(
        &self,
        state: SessionCurrencyState,
        country: Option<CountryCode>,
    ) -> SessionCurrencyState {
        if state.is_explicit()
            || !(self.policy.auto_detect && self.policy.geo_redetect)
        {
            return state;
        }
        self.geo_currency(country)
            .map_or(state, SessionCurrencyState::auto)
    }

    fn first_visit(&self, country: Option<CountryCode>) -> SessionCurrencyState {
        if self.policy.auto_detect {
            let currency = self
                .geo_currency(country)
                .unwrap_or_else(|| self.fallback_currency());
            SessionCurrencyState::auto(currency)
        } else {
            SessionCurrencyState::explicit(self.fallback_currency())
        }
    }

    /// Configured default, then base, then the first enabled currency.
    fn fallback_currency(&self) -> CurrencyCode {
        self.policy
            .default_currency
            .filter(|c| self.is_enabled(*c))
            .or_else(|| Some(self.policy.base).filter(|c| self.is_enabled(*c)))
            .or_else(|| self.policy.enabled.first().copied())
            .unwrap_or(self.policy.base)
    }

    fn report_empty_set(&self) {
        if !self.empty_set_reported.swap(true, Ordering::Relaxed) {
            error!(
                base = %self.policy.base,
                "Enabled currency set is empty, falling back to base currency (configuration invariant)"
            );
        }
    }
}
