//! Common types used across the application.

pub mod code;
pub mod id;
pub mod money;

pub use code::{CountryCode, CurrencyCode, CurrencyCodeError};
pub use id::*;
pub use money::Money;
