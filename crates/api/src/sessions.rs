//! Login sessions.
//!
//! Every successful login registers a [`SheetSession`] under the token's
//! `jti`. Authenticated requests run against that session, so each user sees
//! their own cached view of the spreadsheet and their own writes immediately.
//! Logout removes the entry; expired entries are swept on each login.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cohort_sheets::SheetSession;

#[derive(Clone)]
pub struct LoginSession {
    pub email: String,
    pub role: String,
    /// Unix timestamp after which the entry is dead.
    pub expires_at: i64,
    pub sheets: Arc<SheetSession>,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, LoginSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, LoginSession>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, LoginSession>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `session` under `jti`, dropping entries expired before `now`.
    pub fn insert(&self, jti: &str, session: LoginSession, now: i64) {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!(swept, "Dropped expired sessions");
        }
        sessions.insert(jti.to_string(), session);
    }

    /// Live session for `jti` at `now`.
    pub fn get(&self, jti: &str, now: i64) -> Option<LoginSession> {
        self.read()
            .get(jti)
            .filter(|s| s.expires_at > now)
            .cloned()
    }

    /// Remove the session for `jti`. Returns whether one existed.
    pub fn remove(&self, jti: &str) -> bool {
        self.write().remove(jti).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
