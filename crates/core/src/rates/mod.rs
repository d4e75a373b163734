//! Exchange rate table, refresh, and pairwise rate queries.

pub mod error;
pub mod fetcher;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod table;

#[cfg(test)]
mod props;

pub use error::{FetchError, SnapshotError};
pub use fetcher::RateFetcher;
pub use scheduler::{RefreshScheduler, TickOutcome};
pub use service::{RateLookup, RateLookupMethod, RateService, RateStatus};
pub use store::{InMemorySnapshotRepository, RateStore, SnapshotRepository};
pub use table::{ExchangeRateTable, RawRateMap};
