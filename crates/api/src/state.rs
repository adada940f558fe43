use std::sync::Arc;

use cohort_events::Notifier;
use cohort_sheets::SheetClient;

use crate::config::ServerConfig;
use crate::secrets::AdminCredentials;
use crate::sessions::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// The static administrator credential.
    pub admin: Arc<AdminCredentials>,
    /// Handle to the spreadsheet; hands out per-login sessions.
    pub sheets: SheetClient,
    /// Best-effort participant mail.
    pub notifier: Notifier,
    /// Login sessions keyed by token `jti`.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        admin: AdminCredentials,
        sheets: SheetClient,
        notifier: Notifier,
    ) -> Self {
        Self {
            config: Arc::new(config),
            admin: Arc::new(admin),
            sheets,
            notifier,
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}
