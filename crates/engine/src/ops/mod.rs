use std::{fmt, future::Future, sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use tokio::time::{self, Instant};

use crate::{
    EngineError, ResultEngine, StatsAdjuster, StoredStats,
    locks::{PairKey, PairLocks},
};

mod access;
mod ledger;
mod settlement;
mod simplify;
mod stats;

pub use ledger::{CurrencyTotals, UserSummary};
pub use settlement::{PendingRequest, SettlementOutcome};

const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    stats: Arc<dyn StatsAdjuster>,
    stored_stats: StoredStats,
    pair_locks: PairLocks,
    storage_timeout: Duration,
    retry_attempts: u32,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("storage_timeout", &self.storage_timeout)
            .field("retry_attempts", &self.retry_attempts)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Bounds a storage future by the configured timeout.
    async fn bounded<T, F>(&self, fut: F) -> ResultEngine<T>
    where
        F: Future<Output = ResultEngine<T>>,
    {
        time::timeout(self.storage_timeout, fut)
            .await
            .unwrap_or_else(|_| {
                Err(EngineError::Unavailable("storage timed out".to_string()))
            })
    }

    /// Runs one read-modify-write on a pair while holding the pair's lock.
    ///
    /// Lock acquisition and the unit itself share one deadline. Running out
    /// of time while waiting for the lock is retried like any transient
    /// failure, up to `retry_attempts` in total. Running out of time inside
    /// the unit is not: the commit may already have landed.
    async fn run_pair_unit<T, F, Fut>(&self, key: &PairKey, mut unit: F) -> ResultEngine<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ResultEngine<T>>,
    {
        let mut attempt = 1;
        loop {
            let deadline = Instant::now() + self.storage_timeout;
            let locked = time::timeout_at(deadline, self.pair_locks.lock(key.clone())).await;
            let result = match locked {
                Ok(_guard) => match time::timeout_at(deadline, unit()).await {
                    Ok(result) => result,
                    Err(_) => {
                        return Err(EngineError::Unavailable(
                            "storage timed out, outcome unknown".to_string(),
                        ));
                    }
                },
                Err(_) => Err(EngineError::Unavailable(
                    "timed out waiting for pair lock".to_string(),
                )),
            };
            match result {
                Err(err) if err.is_transient() && attempt < self.retry_attempts => {
                    tracing::warn!(attempt, "retrying pair update: {err}");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    stats: Option<Arc<dyn StatsAdjuster>>,
    storage_timeout: Option<Duration>,
    retry_attempts: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the stats collaborator notified on spend changes. Defaults to
    /// [`StoredStats`] over the same database.
    pub fn stats(mut self, stats: Arc<dyn StatsAdjuster>) -> EngineBuilder {
        self.stats = Some(stats);
        self
    }

    /// Upper bound for a single storage unit of work (default 5s).
    pub fn storage_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.storage_timeout = Some(timeout);
        self
    }

    /// Total attempts for a pair update failing with `Unavailable` (default 3).
    pub fn retry_attempts(mut self, attempts: u32) -> EngineBuilder {
        self.retry_attempts = Some(attempts);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let stored_stats = StoredStats::new(self.database.clone());
        let stats = self
            .stats
            .unwrap_or_else(|| Arc::new(stored_stats.clone()));
        Ok(Engine {
            database: self.database,
            stats,
            stored_stats,
            pair_locks: PairLocks::default(),
            storage_timeout: self.storage_timeout.unwrap_or(DEFAULT_STORAGE_TIMEOUT),
            retry_attempts: self.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS).max(1),
        })
    }
}
