//! Currency reference data and display formatting.

pub mod display;
pub mod error;
pub mod registry;

pub use display::{
    CurrencyDisplaySettings, DisplaySettingsBook, MAX_DECIMALS, NBSP, SymbolPosition,
    format_amount,
};
pub use error::{DisplayError, RegistryError};
pub use registry::{Currency, CurrencyRegistry};
