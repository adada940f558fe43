//! Spreadsheet data-access layer.
//!
//! Every persistent entity is a row in a worksheet of one remote spreadsheet.
//! [`SheetClient`] owns the shared backend handle; each user session gets its
//! own [`SheetSession`] with a private worksheet memo and read cache. The
//! repositories under [`repositories`] read through that cache and write
//! through the key-addressed [`RowMutator`](mutator::RowMutator).

pub mod backend;
pub mod cache;
pub mod error;
pub mod google;
pub mod memory;
pub mod mutator;
pub mod repositories;
pub mod resolver;
pub mod session;
pub mod snapshot;

use std::sync::Arc;

pub use backend::SheetBackend;
pub use error::{SheetError, SheetResult};
pub use google::{GoogleSheetsBackend, ServiceAccountKey};
pub use memory::MemoryBackend;
pub use session::SheetSession;
pub use snapshot::{RowKey, Snapshot};

/// Shared handle to the spreadsheet, cheap to clone.
#[derive(Clone)]
pub struct SheetClient {
    backend: Arc<dyn SheetBackend>,
}

impl SheetClient {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self { backend }
    }

    /// Client for the Google spreadsheet at `sheet_url`.
    pub fn google(key: ServiceAccountKey, sheet_url: &str) -> SheetResult<Self> {
        let backend = GoogleSheetsBackend::new(key, sheet_url)?;
        tracing::info!("Google Sheets backend configured");
        Ok(Self::new(Arc::new(backend)))
    }

    /// Client over an in-process backend.
    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self::new(backend)
    }

    /// Start a new per-user session.
    pub fn session(&self) -> SheetSession {
        SheetSession::new(self.backend.clone(), cache::DEFAULT_TTL)
    }
}
