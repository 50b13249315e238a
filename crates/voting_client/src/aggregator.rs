//! Pure derivations over a tally and the vote detail list. No I/O.

use std::{collections::HashSet, fmt};

use shared::{
    domain::{Timestamp, VoteValue},
    protocol::{Vote, VotingResultData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Approved,
    Rejected,
    Tie,
    NoVotes,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Tie => "TIE",
            Self::NoVotes => "No votes registered",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(yes: u64, no: u64) -> Verdict {
    if yes == 0 && no == 0 {
        return Verdict::NoVotes;
    }
    match yes.cmp(&no) {
        std::cmp::Ordering::Greater => Verdict::Approved,
        std::cmp::Ordering::Less => Verdict::Rejected,
        std::cmp::Ordering::Equal => Verdict::Tie,
    }
}

/// `part / total * 100` rounded half-up to a whole percent, clamped to
/// 0..=100. Zero when `total` is zero.
pub fn percentage(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let part = u128::from(part.min(total));
    let total = u128::from(total);
    let rounded = (part * 100 + total / 2) / total;
    u8::try_from(rounded).unwrap_or(100)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub member_cpf: String,
    pub member_name: String,
    pub vote_value: VoteValue,
    pub voted_at: Option<Timestamp>,
}

impl From<&Vote> for VoteRow {
    fn from(vote: &Vote) -> Self {
        Self {
            member_cpf: vote.member_cpf.clone(),
            member_name: vote.member_name.clone(),
            vote_value: vote.vote_value,
            voted_at: vote.voted_at.clone(),
        }
    }
}

/// One row per voter in backend order; a repeated cpf keeps its first row.
pub fn vote_rows(votes: &[Vote]) -> Vec<VoteRow> {
    let mut seen = HashSet::with_capacity(votes.len());
    votes
        .iter()
        .filter(|vote| seen.insert(vote.member_cpf.as_str()))
        .map(VoteRow::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub tally: VotingResultData,
    pub verdict: Verdict,
    pub yes_percent: u8,
    pub no_percent: u8,
    pub rows: Vec<VoteRow>,
    /// `false` when the backend's total differs from yes + no.
    pub tally_consistent: bool,
}

impl ResultSummary {
    pub fn build(tally: VotingResultData, votes: &[Vote]) -> Self {
        Self {
            tally,
            verdict: classify(tally.yes_votes, tally.no_votes),
            yes_percent: percentage(tally.yes_votes, tally.total_votes),
            no_percent: percentage(tally.no_votes, tally.total_votes),
            rows: vote_rows(votes),
            tally_consistent: tally.is_consistent(),
        }
    }

    /// Whether the detail panel has rows; otherwise it shows its empty state.
    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/aggregator_tests.rs"]
mod tests;
