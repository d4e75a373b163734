//! Per-visitor currency state.
//!
//! A session with no state is `Unset`. Once a currency is stored it is
//! either auto-detected or explicitly chosen; an explicit choice is never
//! replaced by detection.

use std::fmt;

use currex_shared::CurrencyCode;
use serde::{Deserialize, Serialize};

/// How the session's currency was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
    /// Picked from the visitor's country or the shop default.
    AutoDetected,
    /// Picked by the visitor, or the default when detection is off.
    ExplicitlyChosen,
}

impl SelectionOrigin {
    const fn cookie_tag(self) -> &'static str {
        match self {
            Self::AutoDetected => "auto",
            Self::ExplicitlyChosen => "explicit",
        }
    }
}

/// Currency stored for one visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionCurrencyState {
    /// The active currency.
    pub currency: CurrencyCode,
    /// How it was decided.
    pub origin: SelectionOrigin,
}

impl SessionCurrencyState {
    /// State for an auto-detected currency.
    #[must_use]
    pub const fn auto(currency: CurrencyCode) -> Self {
        Self {
            currency,
            origin: SelectionOrigin::AutoDetected,
        }
    }

    /// State for an explicitly chosen currency.
    #[must_use]
    pub const fn explicit(currency: CurrencyCode) -> Self {
        Self {
            currency,
            origin: SelectionOrigin::ExplicitlyChosen,
        }
    }

    /// Returns true if detection must leave this state alone.
    #[must_use]
    pub const fn is_explicit(&self) -> bool {
        matches!(self.origin, SelectionOrigin::ExplicitlyChosen)
    }

    /// Cookie encoding, e.g. `EUR:explicit`.
    #[must_use]
    pub fn to_cookie_value(&self) -> String {
        self.to_string()
    }

    /// Parses a cookie value. A bare code counts as an explicit choice.
    ///
    /// Returns `None` for anything malformed.
    #[must_use]
    pub fn parse_cookie(value: &str) -> Option<Self> {
        let (code, tag) = match value.split_once(':') {
            Some((code, tag)) => (code, Some(tag)),
            None => (value, None),
        };
        let currency = CurrencyCode::parse(code).ok()?;

        match tag.map(str::trim) {
            None | Some("explicit") => Some(Self::explicit(currency)),
            Some("auto") => Some(Self::auto(currency)),
            Some(_) => None,
        }
    }
}

impl fmt::Display for SessionCurrencyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.currency, self.origin.cookie_tag())
    }
}
