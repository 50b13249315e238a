//! Plain-text rendering of the client views.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use shared::{
    domain::VoteValue,
    protocol::{Agenda, Member},
};
use voting_client::{
    notice::{ALREADY_VOTED_WARNING, NO_VOTES_YET, TALLY_MISMATCH_WARNING},
    aggregator,
    validation::format_cpf,
    Notice, NoticeKind, ResultsView, SessionView, VoteRow,
};

pub fn notice(notice: &Notice) -> String {
    match notice.kind() {
        NoticeKind::Success => format!("[ok] {notice}"),
        NoticeKind::Error => format!("[error] {notice}"),
    }
}

fn vote_label(value: VoteValue) -> &'static str {
    match value {
        VoteValue::Sim => "SIM",
        VoteValue::Nao => "NÃO",
    }
}

fn countdown(agenda: &Agenda, now: DateTime<Utc>) -> Option<String> {
    let remaining = agenda.time_remaining(now)?;
    let secs = remaining.num_seconds();
    Some(format!("{}m{:02}s", secs / 60, secs % 60))
}

pub fn agenda_list(agendas: &[Agenda], now: DateTime<Utc>) -> String {
    if agendas.is_empty() {
        return "No agendas yet. Create one to start voting.\n".to_string();
    }
    let mut out = String::new();
    for agenda in agendas {
        let status = if agenda.voting_open {
            "voting open"
        } else {
            "voting closed"
        };
        let _ = writeln!(out, "#{} {} [{status}]", agenda.id, agenda.title);
        if !agenda.description.is_empty() {
            let _ = writeln!(out, "    {}", agenda.description);
        }
        if let Some(created) = &agenda.created_at {
            let _ = writeln!(out, "    created {}", created.display());
        }
        if let (Some(end), Some(left)) = (&agenda.session_end_time, countdown(agenda, now)) {
            let _ = writeln!(out, "    session ends {} ({left} left)", end.display());
        }
    }
    out
}

pub fn member_list(members: &[Member]) -> String {
    let mut out = String::new();
    for member in members {
        let _ = writeln!(out, "{} ({})", member.name, format_cpf(&member.cpf));
    }
    out
}

fn vote_rows(out: &mut String, rows: &[VoteRow]) {
    if rows.is_empty() {
        let _ = writeln!(out, "  {NO_VOTES_YET}");
        return;
    }
    for row in rows {
        let voted_at = row
            .voted_at
            .as_ref()
            .map(|at| format!("  {}", at.display()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {} ({}) {}{voted_at}",
            row.member_name,
            format_cpf(&row.member_cpf),
            vote_label(row.vote_value)
        );
    }
}

pub fn session(view: &SessionView, current: Option<&Notice>, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    match view {
        SessionView::Loading => out.push_str("Loading voting session...\n"),
        SessionView::LoadError(error) => {
            let _ = writeln!(out, "{}", notice(error));
            out.push_str("Go back to the agenda list: coopvote agendas\n");
            return out;
        }
        SessionView::ClosedSession(agenda) => {
            let _ = writeln!(out, "{}", agenda.title);
            out.push_str("Voting session closed. This agenda is no longer open for voting.\n");
            let _ = writeln!(out, "See results: coopvote results {}", agenda.id);
        }
        SessionView::Open(open) => {
            let _ = writeln!(out, "{}", open.agenda.title);
            let _ = writeln!(out, "{}", open.agenda.description);
            if let Some(left) = countdown(&open.agenda, now) {
                let _ = writeln!(out, "Session ends in {left}");
            }
            if let Some(member) = open.selected_member() {
                let _ = writeln!(out, "Selected: {} ({})", member.name, format_cpf(&member.cpf));
            }
            if open.already_voted {
                let _ = writeln!(out, "Warning: {ALREADY_VOTED_WARNING}");
            }
            let _ = writeln!(out, "Registered votes ({}):", open.votes.len());
            vote_rows(&mut out, &aggregator::vote_rows(&open.votes));
        }
    }
    if let Some(current) = current {
        let _ = writeln!(out, "{}", notice(current));
    }
    out
}

pub fn results(view: &ResultsView) -> String {
    let mut out = String::new();
    match view {
        ResultsView::LoadError(error) => {
            let _ = writeln!(out, "{}", notice(error));
        }
        ResultsView::Ready(report) => {
            let summary = &report.summary;
            let _ = writeln!(out, "{}", report.agenda.title);
            let _ = writeln!(out, "Outcome: {}", summary.verdict);
            let _ = writeln!(out, "Total votes: {}", summary.tally.total_votes);
            if !summary.tally_consistent {
                let _ = writeln!(
                    out,
                    "Warning: {TALLY_MISMATCH_WARNING} ({} + {} != {})",
                    summary.tally.yes_votes, summary.tally.no_votes, summary.tally.total_votes
                );
            }
            let _ = writeln!(
                out,
                "SIM: {} ({}%)",
                summary.tally.yes_votes, summary.yes_percent
            );
            let _ = writeln!(
                out,
                "NÃO: {} ({}%)",
                summary.tally.no_votes, summary.no_percent
            );
            let session = if report.can_continue_voting() {
                "open"
            } else {
                "closed"
            };
            let _ = writeln!(out, "Session: {session}");
            out.push_str("Votes:\n");
            vote_rows(&mut out, &summary.rows);
        }
    }
    out
}
