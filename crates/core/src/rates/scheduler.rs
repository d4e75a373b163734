//! Periodic background refresh.

use std::sync::Arc;
use std::time::Duration;

use currex_shared::CurrencyCode;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info};

use super::service::RateService;

/// Shortest tick the scheduler accepts.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// What a single scheduler tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The table was fresh and matched the configured base.
    Skipped,
    /// A new table was swapped in.
    Refreshed,
    /// The fetch failed; the next attempt waits for the next tick.
    Failed,
}

/// Refreshes the rate table on a fixed interval.
///
/// Shares the service's single-flight lock with manual refreshes.
pub struct RefreshScheduler {
    service: Arc<RateService>,
    base: CurrencyCode,
    interval: Duration,
    max_age: Duration,
}

impl RefreshScheduler {
    /// Creates a scheduler for `base`.
    pub fn new(
        service: Arc<RateService>,
        base: CurrencyCode,
        interval: Duration,
        max_age: Duration,
    ) -> Self {
        Self {
            service,
            base,
            interval: interval.max(MIN_INTERVAL),
            max_age,
        }
    }

    /// Runs one tick: refresh only if stale or keyed to another base.
    pub async fn tick(&self) -> TickOutcome {
        let base_changed = self
            .service
            .current_table()
            .is_some_and(|t| t.base() != self.base);

        if !base_changed && !self.service.needs_refresh(self.max_age) {
            debug!(base = %self.base, "Exchange rates are fresh, skipping refresh");
            return TickOutcome::Skipped;
        }

        match self.service.refresh(self.base).await {
            Ok(_) => TickOutcome::Refreshed,
            Err(e) => {
                error!(
                    base = %self.base,
                    kind = e.kind(),
                    error = %e,
                    next_attempt_secs = self.interval.as_secs(),
                    "Scheduled exchange rate refresh failed"
                );
                TickOutcome::Failed
            }
        }
    }

    /// Spawns the scheduler loop. The first tick fires immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                base = %self.base,
                interval_secs = self.interval.as_secs(),
                "Exchange rate scheduler started"
            );
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }
}
