//! Results view: tally, agenda and vote details for one agenda.

use std::sync::Arc;

use futures::future::join3;
use shared::{domain::AgendaId, protocol::Agenda};
use tracing::error;

use crate::{
    aggregator::ResultSummary,
    api::{FetchOutcome, VotingApi},
    notice::{self, Notice},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsReport {
    pub agenda: Agenda,
    pub summary: ResultSummary,
}

impl ResultsReport {
    /// Voting can continue from the results view while the session is open.
    pub fn can_continue_voting(&self) -> bool {
        self.agenda.voting_open
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsView {
    Ready(ResultsReport),
    LoadError(Notice),
}

pub struct ResultsController {
    api: Arc<dyn VotingApi>,
    agenda_id: AgendaId,
}

impl ResultsController {
    pub fn new(api: Arc<dyn VotingApi>, agenda_id: AgendaId) -> Self {
        Self { api, agenda_id }
    }

    /// Tally and agenda are required; vote details degrade to an empty list.
    pub async fn load(&self) -> ResultsView {
        let (tally, agenda, votes) = join3(
            self.api.get_result(&self.agenda_id),
            self.api.get_agenda(&self.agenda_id),
            self.api.list_votes(&self.agenda_id),
        )
        .await;
        let tally = FetchOutcome::from(tally);
        let agenda = FetchOutcome::from(agenda);
        let votes = FetchOutcome::from(votes);

        match (tally.into_result(), agenda.into_result()) {
            (Ok(tally), Ok(agenda)) => {
                let votes = votes.or_empty("votes");
                ResultsView::Ready(ResultsReport {
                    agenda,
                    summary: ResultSummary::build(tally, &votes),
                })
            }
            (Err(reason), _) | (_, Err(reason)) => {
                error!(agenda_id = %self.agenda_id, %reason, "failed to load results");
                ResultsView::LoadError(Notice::error(notice::RESULTS_LOAD_FAILED))
            }
        }
    }
}
