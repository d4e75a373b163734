//! Rate provider abstraction.

use std::time::Duration;

use async_trait::async_trait;
use currex_shared::CurrencyCode;

use super::error::FetchError;
use super::table::RawRateMap;

/// Retrieves a rate table for a base currency from an external provider.
///
/// Implementations make exactly one attempt; retry policy belongs to the
/// scheduler.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    /// Fetches units-per-base rates for `base`, giving up after `timeout`.
    async fn fetch(&self, base: CurrencyCode, timeout: Duration) -> Result<RawRateMap, FetchError>;
}
