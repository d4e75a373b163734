//! Price conversion, fixed-price overrides and formatting.

pub mod converter;
pub mod format;
pub mod overrides;

#[cfg(test)]
mod props;

pub use converter::PriceConverter;
pub use format::PriceFormatter;
pub use overrides::{InMemoryPriceOverrides, PriceOverrideSource, PriceTarget};
