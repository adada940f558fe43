//! Participant notification messages and their fixed templates.
//!
//! Each [`Message`] variant carries exactly the fields its template needs, so
//! a project notification without a project name cannot be constructed.

use serde::Serialize;

/// Address and greeting name of a notification recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: String,
    pub name: String,
}

impl Recipient {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A notification to a single participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The participant was placed on `team`.
    TeamAssignment { team: String },
    /// A project was assigned to the participant's team.
    ProjectAssignment { team: String, project: String },
    /// An administrator reset the participant's password.
    PasswordReset,
}

/// Subject and plain-text body ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

const SIGNATURE: &str = "Best regards,\nThe GenAI Cohort Admin Team";

impl Message {
    /// Stable kind label used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::TeamAssignment { .. } => "team_assignment",
            Message::ProjectAssignment { .. } => "project_assignment",
            Message::PasswordReset => "password_reset",
        }
    }

    /// Fill the template for `recipient`.
    pub fn render(&self, recipient: &Recipient) -> RenderedMessage {
        let name = clean_text(&recipient.name);
        match self {
            Message::TeamAssignment { team } => RenderedMessage {
                subject: "Welcome to GenAI Cohort - Team Assignment".to_string(),
                body: format!(
                    "Dear {name},\n\n\
                     Welcome to the GenAI Cohort! We're excited to have you on board.\n\n\
                     You have been assigned to team: {team}\n\n\
                     To get started:\n\
                     1. Visit our portal\n\
                     2. Click \"Sign Up\"\n\
                     3. Use your email: {email}\n\
                     4. Create your password\n\
                     5. Log in to view your team and project details\n\n\
                     {SIGNATURE}",
                    team = clean_text(team),
                    email = recipient.email.trim(),
                ),
            },
            Message::ProjectAssignment { team, project } => {
                let project = clean_text(project);
                RenderedMessage {
                    subject: format!("New Project Assignment - {project}"),
                    body: format!(
                        "Dear {name},\n\n\
                         A new project has been assigned to your team ({team}).\n\n\
                         Project: {project}\n\n\
                         Please log in to the portal to:\n\
                         - View project details\n\
                         - Collaborate with your team\n\
                         - Submit progress updates\n\n\
                         {SIGNATURE}",
                        team = clean_text(team),
                    ),
                }
            }
            Message::PasswordReset => RenderedMessage {
                subject: "Password Reset Successful".to_string(),
                body: format!(
                    "Dear {name},\n\n\
                     Your password has been reset successfully.\n\n\
                     Please log in to the portal using your new password.\n\n\
                     {SIGNATURE}"
                ),
            },
        }
    }
}

/// Trim, turn non-breaking spaces into plain spaces, and collapse whitespace runs.
pub fn clean_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
