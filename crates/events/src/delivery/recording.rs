//! In-memory mail transport.
//!
//! Keeps every message instead of sending it. Used by tests and by local runs
//! without SMTP credentials. Specific recipients can be made to fail.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;

use super::{Mailer, NotifyError};

/// A message accepted by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
struct State {
    sent: Vec<SentMail>,
    attempts: usize,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct RecordingMailer {
    state: Mutex<State>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `address` fail.
    pub fn fail_for(&self, address: &str) {
        self.lock().failing.insert(address.to_string());
    }

    /// Messages delivered so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.lock().sent.clone()
    }

    /// Sends attempted so far, including failed ones.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.failing.contains(to) {
            return Err(NotifyError::Rejected(format!("{to} refused the message")));
        }
        state.sent.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
