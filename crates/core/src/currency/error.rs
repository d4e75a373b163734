//! Currency reference data errors.

use thiserror::Error;

/// Errors raised while loading the currency dataset.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The dataset could not be read.
    #[error("Failed to read currency dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not valid JSON of the expected shape.
    #[error("Malformed currency dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// The dataset contained no usable currency.
    #[error("Currency dataset contains no valid entries")]
    Empty,
}

/// Errors raised while validating display settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// Unknown symbol position name.
    #[error("Unknown symbol position '{0}'")]
    UnknownPosition(String),

    /// Too many decimal places for `Decimal` rounding.
    #[error("Decimal places must be at most {max}, got {got}")]
    TooManyDecimals {
        /// Maximum supported.
        max: u32,
        /// Requested value.
        got: u32,
    },
}
