//! Read Cache.
//!
//! Time-boxed full-table snapshots, one per table. A fetch that fails while
//! an older snapshot is held degrades to that snapshot instead of failing the
//! read; without one, the error propagates.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use cohort_core::schema::Table;
use tokio::time::Instant;

use crate::error::SheetResult;
use crate::snapshot::Snapshot;

/// How long a snapshot is served without re-fetching.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    snapshot: Arc<Snapshot>,
    fetched_at: Instant,
}

pub struct ReadCache {
    ttl: Duration,
    entries: Mutex<HashMap<Table, Entry>>,
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ReadCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Table, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Snapshot of `table`, calling `fetch` only when none is held or the held
    /// one is older than the TTL.
    pub async fn get<F, Fut>(&self, table: Table, fetch: F) -> SheetResult<Arc<Snapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SheetResult<Snapshot>>,
    {
        let stale = {
            let entries = self.lock();
            match entries.get(&table) {
                Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                    return Ok(entry.snapshot.clone());
                }
                Some(entry) => Some(entry.snapshot.clone()),
                None => None,
            }
        };

        match fetch().await {
            Ok(snapshot) => Ok(self.store(table, snapshot)),
            Err(err) => match stale {
                Some(snapshot) => {
                    if err.is_rate_limited() {
                        tracing::warn!(
                            table = %table,
                            "Rate limited by spreadsheet API, serving cached data"
                        );
                    } else {
                        tracing::warn!(
                            table = %table,
                            error = %err,
                            "Spreadsheet read failed, serving cached data"
                        );
                    }
                    Ok(snapshot)
                }
                None => Err(err),
            },
        }
    }

    /// Fetch `table` unconditionally and store the result. Failures propagate.
    pub async fn refresh<F, Fut>(&self, table: Table, fetch: F) -> SheetResult<Arc<Snapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SheetResult<Snapshot>>,
    {
        let snapshot = fetch().await?;
        Ok(self.store(table, snapshot))
    }

    /// Drop every held snapshot.
    pub fn invalidate(&self) {
        self.lock().clear();
    }

    /// Whether a snapshot of `table` is held, fresh or stale.
    pub fn contains(&self, table: Table) -> bool {
        self.lock().contains_key(&table)
    }

    fn store(&self, table: Table, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.lock().insert(
            table,
            Entry {
                snapshot: snapshot.clone(),
                fetched_at: Instant::now(),
            },
        );
        snapshot
    }
}
