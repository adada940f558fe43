//! Notifier: renders participant messages and sends them best-effort.
//!
//! A send is a single attempt. Any failure, including a message that cannot
//! be rendered meaningfully, is logged and turned into `false`.

use std::sync::Arc;

use cohort_core::notification::{clean_text, Message, Recipient};
use serde::Serialize;

use crate::delivery::Mailer;

/// Per-recipient outcome of a batch send, by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

impl NotificationReport {
    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failed.len()
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Send `message` to `recipient`. Returns whether the mail was accepted.
    pub async fn notify(&self, recipient: &Recipient, message: &Message) -> bool {
        let kind = message.kind();
        if let Message::ProjectAssignment { project, .. } = message {
            if clean_text(project).is_empty() {
                tracing::warn!(
                    to = %recipient.email,
                    kind,
                    "Project name is required for project assignment notifications"
                );
                return false;
            }
        }

        let rendered = message.render(recipient);
        match self
            .mailer
            .send(recipient.email.trim(), &rendered.subject, &rendered.body)
            .await
        {
            Ok(()) => {
                tracing::info!(to = %recipient.email, kind, "Notification sent");
                true
            }
            Err(e) => {
                tracing::warn!(to = %recipient.email, kind, error = %e, "Notification failed");
                false
            }
        }
    }

    /// Send `message` to every recipient in turn; one failure never stops
    /// the rest.
    pub async fn notify_all(&self, recipients: &[Recipient], message: &Message) -> NotificationReport {
        let mut report = NotificationReport::default();
        for recipient in recipients {
            if self.notify(recipient, message).await {
                report.sent.push(recipient.name.clone());
            } else {
                report.failed.push(recipient.name.clone());
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::recording::RecordingMailer;

    fn notifier() -> (Arc<RecordingMailer>, Notifier) {
        let mailer = Arc::new(RecordingMailer::new());
        (mailer.clone(), Notifier::new(mailer))
    }

    #[tokio::test]
    async fn team_assignment_uses_template() {
        let (mailer, notifier) = notifier();
        let ok = notifier
            .notify(
                &Recipient::new("ada@x.com", "Ada\u{a0} Lovelace"),
                &Message::TeamAssignment { team: "Team1".into() },
            )
            .await;

        assert!(ok);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@x.com");
        assert_eq!(sent[0].subject, "Welcome to GenAI Cohort - Team Assignment");
        assert!(sent[0].body.starts_with("Dear Ada Lovelace,"));
        assert!(sent[0].body.contains("You have been assigned to team: Team1"));
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_raised() {
        let (mailer, notifier) = notifier();
        mailer.fail_for("bob@x.com");

        let ok = notifier
            .notify(&Recipient::new("bob@x.com", "Bob"), &Message::PasswordReset)
            .await;

        assert!(!ok);
        assert_eq!(mailer.attempts(), 1);
    }

    #[tokio::test]
    async fn blank_project_name_is_never_sent() {
        let (mailer, notifier) = notifier();
        let ok = notifier
            .notify(
                &Recipient::new("ada@x.com", "Ada"),
                &Message::ProjectAssignment {
                    team: "Team1".into(),
                    project: " ".into(),
                },
            )
            .await;

        assert!(!ok);
        assert_eq!(mailer.attempts(), 0);
    }

    #[tokio::test]
    async fn batch_report_splits_outcomes() {
        let (mailer, notifier) = notifier();
        mailer.fail_for("bob@x.com");

        let report = notifier
            .notify_all(
                &[
                    Recipient::new("ada@x.com", "Ada"),
                    Recipient::new("bob@x.com", "Bob"),
                    Recipient::new("cy@x.com", "Cy"),
                ],
                &Message::ProjectAssignment {
                    team: "Team1".into(),
                    project: "Chatbot".into(),
                },
            )
            .await;

        assert_eq!(report.sent, vec!["Ada", "Cy"]);
        assert_eq!(report.failed, vec!["Bob"]);
        assert_eq!(report.attempted(), 3);
        assert_eq!(mailer.sent()[0].subject, "New Project Assignment - Chatbot");
    }
}
