//! User-facing messages returned by controllers instead of popping alerts.

use std::fmt;

use crate::api::ApiCallError;

pub const MEMBER_REQUIRED: &str = "Select a member before voting.";
pub const DUPLICATE_VOTE: &str = "This member has already voted on this agenda.";
pub const ALREADY_VOTED_WARNING: &str = "This member has already voted on this agenda";
pub const VOTE_FAILED: &str = "Failed to register vote";
pub const SESSION_LOAD_FAILED: &str = "Failed to load data. Check that the backend is running.";
pub const RESULTS_LOAD_FAILED: &str =
    "Failed to load results. Check that the backend is running.";
pub const AGENDAS_LOAD_FAILED: &str = "Failed to load agendas. Check that the backend is running.";
pub const OPEN_SESSION_FAILED: &str = "Failed to open voting session.";
pub const AGENDA_CREATE_FAILED: &str =
    "Failed to create agenda. Check that the backend is running.";
pub const MEMBER_CREATE_FAILED: &str = "Failed to save member";
pub const NO_VOTES_YET: &str = "No votes registered yet";
pub const TALLY_MISMATCH_WARNING: &str = "Backend total does not match the yes and no counts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    kind: NoticeKind,
    text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Error notice carrying the backend message, or `fallback` when the
    /// failure has none (transport errors, empty 4xx bodies).
    pub fn from_api_error(err: &ApiCallError, fallback: &str) -> Self {
        Self::error(err.user_message(fallback))
    }

    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
