//! Participant notifications.
//!
//! - [`Notifier`] renders a [`Message`](cohort_core::notification::Message)
//!   for a recipient and hands it to a [`Mailer`]; failures are logged and
//!   reported as `false`, never raised.
//! - [`delivery`] holds the mail transports: SMTP for production and an
//!   in-memory recorder for tests and local runs.

pub mod delivery;
pub mod notifier;

pub use delivery::email::{MailConfig, SmtpMailer};
pub use delivery::recording::{RecordingMailer, SentMail};
pub use delivery::{Mailer, NotifyError};
pub use notifier::{NotificationReport, Notifier};
