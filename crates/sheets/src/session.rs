//! Per-user-session sheet context.
//!
//! Bundles the shared backend with a private worksheet memo and read cache.
//! A session is created at login and dropped at logout; nothing it caches is
//! visible to other sessions.

use std::sync::Arc;
use std::time::Duration;

use cohort_core::schema::Table;

use crate::backend::SheetBackend;
use crate::cache::ReadCache;
use crate::error::SheetResult;
use crate::mutator::RowMutator;
use crate::resolver::{Worksheet, WorksheetResolver};
use crate::snapshot::Snapshot;

pub struct SheetSession {
    backend: Arc<dyn SheetBackend>,
    resolver: WorksheetResolver,
    cache: ReadCache,
}

impl SheetSession {
    pub fn new(backend: Arc<dyn SheetBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            resolver: WorksheetResolver::new(),
            cache: ReadCache::new(ttl),
        }
    }

    pub fn backend(&self) -> &dyn SheetBackend {
        self.backend.as_ref()
    }

    /// Resolve (and create if absent) the worksheet for `table`.
    pub async fn worksheet(&self, table: Table) -> SheetResult<Worksheet> {
        self.resolver.resolve(self.backend(), table).await
    }

    /// Cached snapshot of `table`.
    pub async fn snapshot(&self, table: Table) -> SheetResult<Arc<Snapshot>> {
        self.cache.get(table, || self.load(table)).await
    }

    /// Snapshot read straight from the backend; also replaces the cached one.
    pub async fn fresh_snapshot(&self, table: Table) -> SheetResult<Arc<Snapshot>> {
        self.cache.refresh(table, || self.load(table)).await
    }

    /// Drop every cached snapshot of this session.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Key-addressed writer for `table`.
    pub fn mutator(&self, table: Table) -> RowMutator<'_> {
        RowMutator::new(self, table)
    }

    /// Destructively rewrite the header row of `table`. See
    /// [`WorksheetResolver::reset_headers`].
    pub async fn reset_headers(&self, table: Table, confirm: bool) -> SheetResult<Worksheet> {
        let ws = self
            .resolver
            .reset_headers(self.backend(), table, confirm)
            .await?;
        self.invalidate();
        Ok(ws)
    }

    /// Append `column` to `table`'s header row if it is missing.
    pub async fn ensure_column(&self, table: Table, column: &str) -> SheetResult<Worksheet> {
        let before = self.worksheet(table).await?;
        let ws = self
            .resolver
            .ensure_column(self.backend(), table, column)
            .await?;
        if ws.headers != before.headers {
            self.invalidate();
        }
        Ok(ws)
    }

    async fn load(&self, table: Table) -> SheetResult<Snapshot> {
        let ws = self.worksheet(table).await?;
        let rows = self.backend.read_all(ws.name()).await?;
        Ok(Snapshot::from_rows(table, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InjectedFailure, MemoryBackend};

    fn session_over(backend: &Arc<MemoryBackend>) -> SheetSession {
        SheetSession::new(backend.clone(), crate::cache::DEFAULT_TTL)
    }

    #[tokio::test]
    async fn reads_are_cached_per_session() {
        let backend = Arc::new(
            MemoryBackend::new().with_sheet("Teams", vec![vec!["TeamName", "Description"]]),
        );
        let admin_a = session_over(&backend);
        let admin_b = session_over(&backend);

        admin_a.snapshot(Table::Teams).await.unwrap();
        admin_a.snapshot(Table::Teams).await.unwrap();
        admin_b.snapshot(Table::Teams).await.unwrap();

        assert_eq!(backend.read_count("Teams"), 2);
    }

    #[tokio::test]
    async fn fresh_snapshot_always_reads() {
        let backend = Arc::new(
            MemoryBackend::new().with_sheet("Teams", vec![vec!["TeamName", "Description"]]),
        );
        let session = session_over(&backend);

        session.snapshot(Table::Teams).await.unwrap();
        session.fresh_snapshot(Table::Teams).await.unwrap();

        assert_eq!(backend.read_count("Teams"), 2);
    }

    #[tokio::test]
    async fn rate_limit_after_invalidate_propagates() {
        let backend = Arc::new(
            MemoryBackend::new().with_sheet("Teams", vec![vec!["TeamName", "Description"]]),
        );
        let session = session_over(&backend);

        session.snapshot(Table::Teams).await.unwrap();
        session.invalidate();
        backend.fail_next_read(InjectedFailure::RateLimited);

        assert!(session.snapshot(Table::Teams).await.is_err());
    }
}
