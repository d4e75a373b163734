//! Per-currency display settings and price formatting.
//!
//! Formatting is pure: the same amount and settings always produce the
//! same string, wherever the price is shown.

use std::collections::HashMap;
use std::str::FromStr;

use currex_shared::{CurrencyCode, DisplayConfig};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::DisplayError;

/// Highest scale `Decimal` can represent.
pub const MAX_DECIMALS: u32 = 28;

/// Joiner used by the `*_space` positions.
pub const NBSP: char = '\u{a0}';

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// `$99.99`
    #[default]
    Left,
    /// `99.99$`
    Right,
    /// `$ 99.99`
    LeftSpace,
    /// `99.99 $`
    RightSpace,
}

impl FromStr for SymbolPosition {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "left_space" => Ok(Self::LeftSpace),
            "right_space" => Ok(Self::RightSpace),
            _ => Err(DisplayError::UnknownPosition(s.to_string())),
        }
    }
}

/// How amounts in one currency are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDisplaySettings {
    /// Currency these settings apply to.
    pub currency_code: CurrencyCode,
    /// Symbol placement.
    pub position: SymbolPosition,
    /// Decimal places shown.
    pub decimals: u32,
    /// Digit group separator.
    pub thousand_sep: String,
    /// Separator between integer and fractional part.
    pub decimal_sep: String,
}

impl CurrencyDisplaySettings {
    /// Shop defaults: symbol on the left, 2 decimals, "," and ".".
    #[must_use]
    pub fn new(currency_code: CurrencyCode) -> Self {
        Self {
            currency_code,
            position: SymbolPosition::Left,
            decimals: 2,
            thousand_sep: ",".to_string(),
            decimal_sep: ".".to_string(),
        }
    }

    /// Sets the symbol position.
    #[must_use]
    pub fn with_position(mut self, position: SymbolPosition) -> Self {
        self.position = position;
        self
    }

    /// Sets the number of decimals, capped at [`MAX_DECIMALS`].
    #[must_use]
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals.min(MAX_DECIMALS);
        self
    }

    /// Sets both separators.
    #[must_use]
    pub fn with_separators(mut self, thousand_sep: &str, decimal_sep: &str) -> Self {
        self.thousand_sep = thousand_sep.to_string();
        self.decimal_sep = decimal_sep.to_string();
        self
    }

    /// Builds settings from admin configuration, filling gaps with defaults.
    pub fn from_config(
        currency_code: CurrencyCode,
        config: &DisplayConfig,
    ) -> Result<Self, DisplayError> {
        let mut settings = Self::new(currency_code);

        if let Some(position) = &config.position {
            settings.position = position.parse()?;
        }
        if let Some(decimals) = config.decimals {
            if decimals > MAX_DECIMALS {
                return Err(DisplayError::TooManyDecimals {
                    max: MAX_DECIMALS,
                    got: decimals,
                });
            }
            settings.decimals = decimals;
        }
        if let Some(sep) = &config.thousand_sep {
            settings.thousand_sep.clone_from(sep);
        }
        if let Some(sep) = &config.decimal_sep {
            settings.decimal_sep.clone_from(sep);
        }

        Ok(settings)
    }
}

/// Rounds `amount` to the display precision and renders it with `symbol`.
///
/// Midpoints round away from zero, the way shop totals are printed.
#[must_use]
pub fn format_amount(amount: Decimal, settings: &CurrencyDisplaySettings, symbol: &str) -> String {
    let decimals = settings.decimals.min(MAX_DECIMALS);
    let mut rounded = amount
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    rounded.rescale(decimals);

    let digits = rounded.to_string();
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), ""));

    let mut number = group_thousands(integer, &settings.thousand_sep);
    if decimals > 0 {
        // `rescale` cannot widen amounts near `Decimal::MAX`, so pad by hand.
        number.push_str(&settings.decimal_sep);
        number.push_str(fraction);
        for _ in fraction.len()..decimals as usize {
            number.push('0');
        }
    }

    let placed = match settings.position {
        SymbolPosition::Left => format!("{symbol}{number}"),
        SymbolPosition::Right => format!("{number}{symbol}"),
        SymbolPosition::LeftSpace => format!("{symbol}{NBSP}{number}"),
        SymbolPosition::RightSpace => format!("{number}{NBSP}{symbol}"),
    };

    if amount.is_sign_negative() && !rounded.is_zero() {
        format!("-{placed}")
    } else {
        placed
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Display settings for every enabled currency.
#[derive(Debug, Clone, Default)]
pub struct DisplaySettingsBook {
    settings: HashMap<CurrencyCode, CurrencyDisplaySettings>,
}

impl DisplaySettingsBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds default settings for `code` unless some already exist.
    pub fn enable(&mut self, code: CurrencyCode) {
        self.settings
            .entry(code)
            .or_insert_with(|| CurrencyDisplaySettings::new(code));
    }

    /// Stores settings, replacing any previous ones for that currency.
    pub fn insert(&mut self, settings: CurrencyDisplaySettings) {
        self.settings.insert(settings.currency_code, settings);
    }

    /// Settings for `code`, or the shop defaults.
    #[must_use]
    pub fn get(&self, code: CurrencyCode) -> CurrencyDisplaySettings {
        self.settings
            .get(&code)
            .cloned()
            .unwrap_or_else(|| CurrencyDisplaySettings::new(code))
    }
}
