//! Agenda list with the open-session action.

use std::sync::Arc;

use shared::{
    domain::AgendaId,
    protocol::{Agenda, OpenSessionRequest},
};
use tracing::{info, warn};

use crate::{
    api::VotingApi,
    notice::{self, Notice},
};

pub struct AgendaBoard {
    api: Arc<dyn VotingApi>,
    agendas: Vec<Agenda>,
}

impl AgendaBoard {
    pub fn new(api: Arc<dyn VotingApi>) -> Self {
        Self {
            api,
            agendas: Vec::new(),
        }
    }

    pub fn agendas(&self) -> &[Agenda] {
        &self.agendas
    }

    /// Replaces the local list. On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<&[Agenda], Notice> {
        match self.api.list_agendas().await {
            Ok(agendas) => {
                self.agendas = agendas;
                Ok(&self.agendas)
            }
            Err(err) => {
                warn!(error = %err, "failed to list agendas");
                Err(Notice::error(notice::AGENDAS_LOAD_FAILED))
            }
        }
    }

    /// Opens a voting session for `minutes` (absent or non-positive means
    /// one minute) and marks the local copy of the agenda as open.
    pub async fn open_session(&mut self, agenda_id: &AgendaId, minutes: Option<i64>) -> Notice {
        let request = OpenSessionRequest::new(minutes);
        match self.api.open_voting_session(agenda_id, request).await {
            Ok(()) => {
                info!(%agenda_id, minutes = request.duration_minutes, "voting session opened");
                if let Some(agenda) = self.agendas.iter_mut().find(|a| &a.id == agenda_id) {
                    agenda.mark_session_opened();
                }
                Notice::success(format!(
                    "Voting session opened for {} minute(s)!",
                    request.duration_minutes
                ))
            }
            Err(err) => {
                warn!(%agenda_id, error = %err, "failed to open voting session");
                Notice::from_api_error(&err, notice::OPEN_SESSION_FAILED)
            }
        }
    }
}
