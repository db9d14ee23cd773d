//! Interface to the CvLAC form-filling collaborator.
//!
//! Logging into the portal and driving its UI is browser scripting against a
//! third-party page and is not implemented here. The crate only hands a
//! [`FormPayload`] and a [`Session`] to a [`FormSubmitter`] and passes the
//! reported outcome through untouched.

use crate::extract::{FormPayload, SPANISH_MONTHS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Handle to a portal session authenticated elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Free-form label for logs (e.g. the researcher name)
    pub label: String,
    pub active: bool,
}

impl Session {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            active: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Success,
    Error,
}

/// Result of one submission attempt, as reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub status: SubmissionStatus,
    pub message: String,
    pub session_active: bool,
}

impl SubmissionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Success,
            message: message.into(),
            session_active: true,
        }
    }

    pub fn error(message: impl Into<String>, session_active: bool) -> Self {
        Self {
            status: SubmissionStatus::Error,
            message: message.into(),
            session_active,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }
}

/// Fills one scientific article form in the portal.
///
/// Each call is one independent attempt; implementations keep no queue or
/// retry state.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, payload: &FormPayload, session: &Session) -> SubmissionOutcome;
}

impl FormPayload {
    /// Checks the portal would reject before any field is filled.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if let Some(month) = self.month.as_deref() {
            if !SPANISH_MONTHS.contains(&month) {
                return Err(
                    "month must be in Spanish starting with capital letter, e.g 'Enero'"
                        .to_string(),
                );
            }
        }
        if let Some(year) = self.year {
            if !(1000..=9999).contains(&year) {
                return Err(format!("year must have four digits, got {}", year));
            }
        }
        Ok(())
    }
}

/// Submitter that never touches the portal: validates and logs the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSubmitter;

#[async_trait]
impl FormSubmitter for DryRunSubmitter {
    async fn submit(&self, payload: &FormPayload, session: &Session) -> SubmissionOutcome {
        if !session.active {
            return SubmissionOutcome::error("session is not active", false);
        }
        if let Err(message) = payload.validate() {
            return SubmissionOutcome::error(message, true);
        }
        info!(
            session = %session.label,
            title = %payload.title,
            article_type = %payload.article_type,
            doi = payload.doi.as_deref().unwrap_or(""),
            "Dry run: would fill scientific article form"
        );
        SubmissionOutcome::success(format!("dry run: {}", payload.title))
    }
}
