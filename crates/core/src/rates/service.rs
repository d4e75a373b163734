//! Rate service: single-flight refresh and pairwise rate queries.
//!
//! All pairwise rates are derived from one base-relative table. A pair
//! where neither side is the base is composed through the base.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use currex_shared::CurrencyCode;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::error::FetchError;
use super::fetcher::RateFetcher;
use super::store::{RateStore, SnapshotRepository};
use super::table::ExchangeRateTable;

/// How a pairwise rate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLookupMethod {
    /// Same currency on both sides.
    Identity,
    /// `from` is the base; the stored rate is used as is.
    Direct,
    /// `to` is the base; the stored rate is inverted.
    Inverse,
    /// Neither side is the base; composed through it.
    Triangulated,
    /// A needed entry was missing; 1 was substituted.
    Fallback,
}

/// Result of a pairwise rate query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLookup {
    /// Units of `to` per unit of `from`.
    pub rate: Decimal,
    /// How the rate was obtained.
    pub method: RateLookupMethod,
}

impl RateLookup {
    const fn new(rate: Decimal, method: RateLookupMethod) -> Self {
        Self { rate, method }
    }

    const fn fallback() -> Self {
        Self::new(Decimal::ONE, RateLookupMethod::Fallback)
    }
}

/// Snapshot of the service state for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateStatus {
    /// Base of the current table.
    pub base: Option<CurrencyCode>,
    /// Number of entries in the current table.
    pub entries: usize,
    /// When the current table was fetched.
    pub last_updated: Option<chrono::DateTime<Utc>>,
    /// Whether the table is missing or older than the allowed age.
    pub stale: bool,
}

/// Maintains the base-relative rate table and answers rate queries.
pub struct RateService {
    fetcher: Arc<dyn RateFetcher>,
    store: RateStore,
    snapshots: Option<Arc<dyn SnapshotRepository>>,
    refresh_lock: Mutex<()>,
    fetch_timeout: Duration,
}

impl RateService {
    /// Creates a service with an empty table.
    pub fn new(fetcher: Arc<dyn RateFetcher>, fetch_timeout: Duration) -> Self {
        Self {
            fetcher,
            store: RateStore::new(),
            snapshots: None,
            refresh_lock: Mutex::new(()),
            fetch_timeout,
        }
    }

    /// Persists every successfully fetched table to `repository`.
    #[must_use]
    pub fn with_snapshots(mut self, repository: Arc<dyn SnapshotRepository>) -> Self {
        self.snapshots = Some(repository);
        self
    }

    /// Seeds the store with a known table.
    #[must_use]
    pub fn with_table(self, table: ExchangeRateTable) -> Self {
        self.store.replace(table);
        self
    }

    /// Loads the persisted snapshot into the store, if there is one.
    ///
    /// Returns true when a snapshot was loaded.
    pub async fn warm_start(&self) -> bool {
        let Some(repository) = &self.snapshots else {
            return false;
        };

        match repository.load().await {
            Ok(Some(table)) => {
                info!(
                    base = %table.base(),
                    entries = table.len(),
                    last_updated = %table.last_updated(),
                    "Loaded exchange rate snapshot"
                );
                self.store.replace(table);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to load exchange rate snapshot");
                false
            }
        }
    }

    /// Fetches a new table for `base` and swaps it in.
    ///
    /// On failure the previous table and timestamp are left untouched.
    /// Concurrent callers are serialized; a caller that waited on a refresh
    /// for the same base gets that result instead of fetching again.
    pub async fn refresh(&self, base: CurrencyCode) -> Result<Arc<ExchangeRateTable>, FetchError> {
        let observed = self.store.generation();
        let _guard = self.refresh_lock.lock().await;

        if self.store.generation() != observed {
            if let Some(table) = self.store.current().filter(|t| t.base() == base) {
                debug!(base = %base, "Refresh already completed by a concurrent caller");
                return Ok(table);
            }
        }

        let raw = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(base, self.fetch_timeout)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(base = %base, kind = e.kind(), error = %e, "Exchange rate fetch failed");
                return Err(e);
            }
            Err(_) => {
                let e = FetchError::Timeout(self.fetch_timeout.as_secs());
                warn!(base = %base, kind = e.kind(), "Exchange rate fetch timed out");
                return Err(e);
            }
        };

        let table = ExchangeRateTable::from_raw(base, raw, Utc::now());
        if table.len() <= 1 {
            let e = FetchError::NoUsableRates;
            warn!(base = %base, kind = e.kind(), "Exchange rate response had no usable rates");
            return Err(e);
        }

        let table = self.store.replace(table);
        info!(base = %base, entries = table.len(), "Exchange rates refreshed");

        if let Some(repository) = &self.snapshots {
            if let Err(e) = repository.save(&table).await {
                warn!(error = %e, "Failed to persist exchange rate snapshot");
            }
        }

        Ok(table)
    }

    /// Refreshes and reports success as a flag.
    pub async fn refresh_rates(&self, base: CurrencyCode) -> bool {
        self.refresh(base).await.is_ok()
    }

    /// Pairwise rate with the method used to obtain it. Never fails.
    #[must_use]
    pub fn lookup_rate(&self, from: CurrencyCode, to: CurrencyCode) -> RateLookup {
        if from == to {
            return RateLookup::new(Decimal::ONE, RateLookupMethod::Identity);
        }

        let Some(table) = self.store.current() else {
            return RateLookup::fallback();
        };
        let base = table.base();

        if from == base {
            return table
                .rate(to)
                .map_or_else(RateLookup::fallback, |rate| {
                    RateLookup::new(rate, RateLookupMethod::Direct)
                });
        }

        let Some(from_rate) = table.rate(from) else {
            return RateLookup::fallback();
        };

        if to == base {
            return Decimal::ONE
                .checked_div(from_rate)
                .map_or_else(RateLookup::fallback, |rate| {
                    RateLookup::new(rate, RateLookupMethod::Inverse)
                });
        }

        table
            .rate(to)
            .and_then(|to_rate| to_rate.checked_div(from_rate))
            .map_or_else(RateLookup::fallback, |rate| {
                RateLookup::new(rate, RateLookupMethod::Triangulated)
            })
    }

    /// Units of `to` per unit of `from`; 1 when the table cannot answer.
    #[must_use]
    pub fn get_rate(&self, from: CurrencyCode, to: CurrencyCode) -> Decimal {
        let lookup = self.lookup_rate(from, to);
        if lookup.method == RateLookupMethod::Fallback {
            warn!(
                from = %from,
                to = %to,
                "Missing exchange rate, falling back to 1 (data integrity)"
            );
        }
        lookup.rate
    }

    /// True if no fetch has succeeded yet or the table is older than `max_age`.
    #[must_use]
    pub fn needs_refresh(&self, max_age: Duration) -> bool {
        let Some(last_updated) = self.store.last_updated() else {
            return true;
        };
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return false;
        };
        Utc::now() - last_updated > max_age
    }

    /// The table currently in force.
    #[must_use]
    pub fn current_table(&self) -> Option<Arc<ExchangeRateTable>> {
        self.store.current()
    }

    /// Operator-facing summary; `max_age` decides staleness.
    #[must_use]
    pub fn status(&self, max_age: Duration) -> RateStatus {
        let table = self.store.current();
        RateStatus {
            base: table.as_ref().map(|t| t.base()),
            entries: table.as_ref().map_or(0, |t| t.len()),
            last_updated: table.as_ref().map(|t| t.last_updated()),
            stale: self.needs_refresh(max_age),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rates::store::InMemorySnapshotRepository;
    use crate::rates::table::RawRateMap;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher returning a canned answer and counting calls.
    pub(crate) struct StubFetcher {
        pub(crate) response: std::sync::Mutex<Result<RawRateMap, FetchError>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) delay: Duration,
    }

    impl StubFetcher {
        pub(crate) fn ok(rates: &[(&str, Decimal)]) -> Self {
            let raw = rates.iter().map(|(c, r)| ((*c).to_string(), *r)).collect();
            Self {
                response: std::sync::Mutex::new(Ok(raw)),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        pub(crate) fn failing(error: FetchError) -> Self {
            Self {
                response: std::sync::Mutex::new(Err(error)),
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub(crate) fn set_response(&self, response: Result<RawRateMap, FetchError>) {
            *self.response.lock().unwrap() = response;
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateFetcher for StubFetcher {
        async fn fetch(
            &self,
            _base: CurrencyCode,
            _timeout: Duration,
        ) -> Result<RawRateMap, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.response.lock().unwrap().clone()
        }
    }

    pub(crate) fn scenario_table() -> ExchangeRateTable {
        ExchangeRateTable::new(
            CurrencyCode::USD,
            [
                (CurrencyCode::EUR, dec!(0.9)),
                (CurrencyCode::GBP, dec!(0.8)),
            ],
            Utc::now(),
        )
    }

    pub(crate) fn scenario_service() -> RateService {
        let fetcher = Arc::new(StubFetcher::failing(FetchError::MissingRates));
        RateService::new(fetcher, Duration::from_secs(15)).with_table(scenario_table())
    }

    fn jpy() -> CurrencyCode {
        CurrencyCode::parse("JPY").unwrap()
    }

    #[test]
    fn test_identity_rate() {
        let service = scenario_service();
        let lookup = service.lookup_rate(CurrencyCode::EUR, CurrencyCode::EUR);
        assert_eq!(lookup, RateLookup::new(Decimal::ONE, RateLookupMethod::Identity));
    }

    #[test]
    fn test_direct_inverse_and_triangulated() {
        let service = scenario_service();

        let direct = service.lookup_rate(CurrencyCode::USD, CurrencyCode::EUR);
        assert_eq!(direct.rate, dec!(0.9));
        assert_eq!(direct.method, RateLookupMethod::Direct);

        let inverse = service.lookup_rate(CurrencyCode::GBP, CurrencyCode::USD);
        assert_eq!(inverse.rate, dec!(1.25));
        assert_eq!(inverse.method, RateLookupMethod::Inverse);

        let cross = service.lookup_rate(CurrencyCode::EUR, CurrencyCode::GBP);
        assert_eq!(cross.method, RateLookupMethod::Triangulated);
        assert_eq!(cross.rate.round_dp(4), dec!(0.8889));
    }

    #[test]
    fn test_missing_entry_falls_back_to_one() {
        let service = scenario_service();
        assert_eq!(service.get_rate(CurrencyCode::USD, jpy()), Decimal::ONE);
        assert_eq!(service.get_rate(jpy(), CurrencyCode::EUR), Decimal::ONE);
        assert_eq!(
            service.lookup_rate(CurrencyCode::EUR, jpy()).method,
            RateLookupMethod::Fallback
        );
    }

    #[test]
    fn test_empty_store_falls_back_to_one() {
        let service = RateService::new(
            Arc::new(StubFetcher::failing(FetchError::MissingRates)),
            Duration::from_secs(15),
        );
        assert_eq!(service.get_rate(CurrencyCode::USD, CurrencyCode::EUR), Decimal::ONE);
        assert!(service.needs_refresh(Duration::from_secs(86_400)));
        let status = service.status(Duration::from_secs(86_400));
        assert_eq!(status.entries, 0);
        assert!(status.stale);
    }

    #[tokio::test]
    async fn test_refresh_replaces_table() {
        let fetcher = Arc::new(StubFetcher::ok(&[("USD", dec!(1)), ("EUR", dec!(0.91)), ("JPY", dec!(149.2))]));
        let service = RateService::new(fetcher.clone(), Duration::from_secs(15));

        let table = service.refresh(CurrencyCode::USD).await.unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(service.get_rate(CurrencyCode::USD, jpy()), dec!(149.2));
        assert!(!service.needs_refresh(Duration::from_secs(60)));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_table() {
        let fetcher = Arc::new(StubFetcher::failing(FetchError::Transport("connection refused".into())));
        let service = RateService::new(fetcher, Duration::from_secs(15)).with_table(scenario_table());
        let before = service.current_table().unwrap();

        let result = service.refresh(CurrencyCode::USD).await;

        assert_eq!(result.unwrap_err(), FetchError::Transport("connection refused".into()));
        let after = service.current_table().unwrap();
        assert_eq!(after.last_updated(), before.last_updated());
        assert_eq!(*after, *before);
    }

    #[tokio::test]
    async fn test_refresh_with_only_base_is_rejected() {
        let fetcher = Arc::new(StubFetcher::ok(&[("USD", dec!(1)), ("NOPE!", dec!(2))]));
        let service = RateService::new(fetcher, Duration::from_secs(15)).with_table(scenario_table());

        assert_eq!(
            service.refresh(CurrencyCode::USD).await.unwrap_err(),
            FetchError::NoUsableRates
        );
        assert_eq!(service.get_rate(CurrencyCode::USD, CurrencyCode::EUR), dec!(0.9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_times_out() {
        let fetcher = Arc::new(StubFetcher::ok(&[("EUR", dec!(0.9))]).with_delay(Duration::from_secs(60)));
        let service = RateService::new(fetcher, Duration::from_secs(15));

        assert_eq!(
            service.refresh(CurrencyCode::USD).await.unwrap_err(),
            FetchError::Timeout(15)
        );
        assert!(service.current_table().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_share_one_fetch() {
        let fetcher = Arc::new(StubFetcher::ok(&[("EUR", dec!(0.9))]).with_delay(Duration::from_millis(50)));
        let service = Arc::new(RateService::new(fetcher.clone(), Duration::from_secs(15)));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.refresh(CurrencyCode::USD).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_with_new_base_refetches() {
        let fetcher = Arc::new(StubFetcher::ok(&[("USD", dec!(1.1))]));
        let service = RateService::new(fetcher.clone(), Duration::from_secs(15)).with_table(scenario_table());

        let table = service.refresh(CurrencyCode::EUR).await.unwrap();
        assert_eq!(table.base(), CurrencyCode::EUR);
        assert_eq!(service.get_rate(CurrencyCode::EUR, CurrencyCode::USD), dec!(1.1));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_saved_and_warm_started() {
        let repository = Arc::new(InMemorySnapshotRepository::new());
        let fetcher = Arc::new(StubFetcher::ok(&[("EUR", dec!(0.9))]));
        let service = RateService::new(fetcher, Duration::from_secs(15))
            .with_snapshots(repository.clone());
        service.refresh(CurrencyCode::USD).await.unwrap();

        let restarted = RateService::new(
            Arc::new(StubFetcher::failing(FetchError::MissingRates)),
            Duration::from_secs(15),
        )
        .with_snapshots(repository);
        assert!(restarted.warm_start().await);
        assert_eq!(restarted.get_rate(CurrencyCode::USD, CurrencyCode::EUR), dec!(0.9));
    }

    #[tokio::test]
    async fn test_refresh_rates_flag() {
        let fetcher = Arc::new(StubFetcher::failing(FetchError::Status(503)));
        let service = RateService::new(fetcher.clone(), Duration::from_secs(15));
        assert!(!service.refresh_rates(CurrencyCode::USD).await);

        fetcher.set_response(Ok(RawRateMap::from([("EUR".to_string(), dec!(0.9))])));
        assert!(service.refresh_rates(CurrencyCode::USD).await);
    }

    #[test]
    fn test_status_reports_current_table() {
        let service = scenario_service();
        let status = service.status(Duration::from_secs(86_400));
        assert_eq!(status.base, Some(CurrencyCode::USD));
        assert_eq!(status.entries, 3);
        assert!(status.last_updated.is_some());
        assert!(!status.stale);
    }

    #[tokio::test]
    async fn test_warm_started_old_snapshot_is_stale() {
        let old = ExchangeRateTable::new(
            CurrencyCode::USD,
            [(CurrencyCode::EUR, dec!(0.9))],
            Utc::now() - chrono::Duration::days(2),
        );
        let repository = Arc::new(InMemorySnapshotRepository::with_table(old));
        let fetcher = Arc::new(StubFetcher::failing(FetchError::MissingRates));
        let service = RateService::new(fetcher, Duration::from_secs(15)).with_snapshots(repository);

        assert!(service.warm_start().await);
        let status = service.status(Duration::from_secs(86_400));
        assert_eq!(status.entries, 2);
        assert!(status.stale);
    }
}
