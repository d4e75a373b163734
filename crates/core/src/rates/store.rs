//! Current exchange rate table and its external persistence.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::SnapshotError;
use super::table::ExchangeRateTable;

/// Holds the table every reader sees.
///
/// Readers clone an `Arc` under a read lock that is only ever contended by
/// the pointer swap in [`RateStore::replace`], never by a fetch.
#[derive(Debug, Default)]
pub struct RateStore {
    current: RwLock<Option<Arc<ExchangeRateTable>>>,
    generation: AtomicU64,
}

impl RateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table currently in force, if any fetch ever succeeded.
    #[must_use]
    pub fn current(&self) -> Option<Arc<ExchangeRateTable>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically swaps in a new table and bumps the generation.
    pub fn replace(&self, table: ExchangeRateTable) -> Arc<ExchangeRateTable> {
        let table = Arc::new(table);
        {
            let mut current = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = Some(Arc::clone(&table));
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        table
    }

    /// Increases by one on every successful replace.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Timestamp of the current table.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.current().map(|t| t.last_updated())
    }
}

/// External persistence for the last good table.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the persisted table, if one exists.
    async fn load(&self) -> Result<Option<ExchangeRateTable>, SnapshotError>;

    /// Persists `table`, replacing the previous snapshot.
    async fn save(&self, table: &ExchangeRateTable) -> Result<(), SnapshotError>;
}

/// Snapshot repository that lives only as long as the process.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshot: Mutex<Option<ExchangeRateTable>>,
}

impl InMemorySnapshotRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `table`.
    #[must_use]
    pub fn with_table(table: ExchangeRateTable) -> Self {
        Self {
            snapshot: Mutex::new(Some(table)),
        }
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn load(&self) -> Result<Option<ExchangeRateTable>, SnapshotError> {
        Ok(self
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn save(&self, table: &ExchangeRateTable) -> Result<(), SnapshotError> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = Some(table.clone());
        Ok(())
    }
}
