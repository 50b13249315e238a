use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AgendaId, AgendaStatus, MemberId, Timestamp, VoteValue};

/// Duration used when an open-session request carries no usable value.
pub const DEFAULT_SESSION_MINUTES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    pub id: AgendaId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    pub status: AgendaStatus,
    #[serde(default)]
    pub voting_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_end_time: Option<Timestamp>,
}

impl Agenda {
    /// Time left until `sessionEndTime`, for display only. The backend's
    /// `votingOpen` flag stays authoritative.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if !self.voting_open {
            return None;
        }
        let end = self.session_end_time.as_ref()?.parse()?;
        Some((end - now).max(Duration::zero()))
    }

    pub fn mark_session_opened(&mut self) {
        self.voting_open = true;
        self.status = AgendaStatus::Open;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub cpf: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub member_cpf: String,
    #[serde(default)]
    pub member_name: String,
    pub vote_value: VoteValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voted_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingResultData {
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_votes: u64,
}

impl VotingResultData {
    pub fn new(yes_votes: u64, no_votes: u64) -> Self {
        Self {
            yes_votes,
            no_votes,
            total_votes: yes_votes.saturating_add(no_votes),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.yes_votes.checked_add(self.no_votes) == Some(self.total_votes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgendaRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAgendaResponse {
    pub id: AgendaId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub cpf: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub member_cpf: String,
    pub vote_value: VoteValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub duration_minutes: u32,
}

impl OpenSessionRequest {
    /// Absent or non-positive durations fall back to one minute.
    pub fn new(duration_minutes: Option<i64>) -> Self {
        let duration_minutes = duration_minutes
            .filter(|minutes| *minutes > 0)
            .map_or(DEFAULT_SESSION_MINUTES, |minutes| {
                u32::try_from(minutes).unwrap_or(u32::MAX)
            });
        Self { duration_minutes }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
