//! Configuration errors.

use currex_shared::{AppError, CurrencyCodeError};
use thiserror::Error;

use crate::currency::DisplayError;

/// Shop configuration that violates an invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A currency code in `field` is not a valid ISO code.
    #[error("Invalid currency code in {field}: {source}")]
    InvalidCurrency {
        /// Configuration key.
        field: &'static str,
        /// Parse failure.
        source: CurrencyCodeError,
    },

    /// A country code in `field` is not a valid ISO code.
    #[error("Invalid country code in {field}: {source}")]
    InvalidCountry {
        /// Configuration key.
        field: &'static str,
        /// Parse failure.
        source: CurrencyCodeError,
    },

    /// Display settings for a currency are unusable.
    #[error("Invalid display settings for {currency}: {source}")]
    Display {
        /// Currency the settings belong to.
        currency: String,
        /// What is wrong with them.
        source: DisplayError,
    },
}

impl From<ConfigurationError> for AppError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err.to_string())
    }
}
