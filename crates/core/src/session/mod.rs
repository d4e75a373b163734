//! Visitor currency state and resolution.

pub mod geo;
pub mod resolver;
pub mod state;

#[cfg(test)]
mod props;

pub use geo::{CountryCurrencyMap, GeoLocator, HeaderGeoLocator, HeaderLookup};
pub use resolver::{RequestSignals, Resolution, ResolverPolicy, SessionCurrencyResolver};
pub use state::{SelectionOrigin, SessionCurrencyState};
