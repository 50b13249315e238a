//! Voting-session view state machine.
//!
//! ```text
//! Loading ──► Open ──submit ok──► Loading (refetch)
//!    │
//!    ├──────► ClosedSession
//!    └──────► LoadError
//! ```
//!
//! The controller never inserts a vote into its local list; after a
//! successful submission it refetches and shows whatever the backend holds.

use std::sync::Arc;

use futures::future::join3;
use shared::{
    domain::{AgendaId, VoteValue},
    protocol::{Agenda, Member, SubmitVoteRequest, Vote},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    api::{FetchOutcome, VotingApi},
    notice::{self, Notice},
    validation::normalize_cpf,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    Loading,
    Open(OpenSession),
    ClosedSession(Agenda),
    LoadError(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSession {
    pub agenda: Agenda,
    pub members: Vec<Member>,
    pub votes: Vec<Vote>,
    pub selected_cpf: Option<String>,
    /// Advisory: the selected member already appears in `votes`.
    pub already_voted: bool,
    pub submitting: bool,
}

impl OpenSession {
    /// Member selector and vote buttons accept input.
    pub fn controls_enabled(&self) -> bool {
        !self.submitting
    }

    pub fn can_vote(&self) -> bool {
        self.controls_enabled() && self.selected_cpf.is_some() && !self.already_voted
    }

    pub fn selected_member(&self) -> Option<&Member> {
        let cpf = self.selected_cpf.as_deref()?;
        self.members
            .iter()
            .find(|member| normalize_cpf(&member.cpf) == cpf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected { already_voted: bool },
    Cleared,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Backend accepted the vote; the session has been refetched.
    Registered(VoteValue),
    /// A local precondition failed; the backend was not called.
    Refused(Notice),
    /// The backend or transport failed; the selection is kept for retry.
    Failed(Notice),
    /// Not in an open session, or another submit is in flight.
    Ignored,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(SessionView),
    Notice(Notice),
}

enum Phase {
    Loading,
    Open {
        agenda: Agenda,
        members: Vec<Member>,
        votes: Vec<Vote>,
    },
    Closed(Agenda),
    LoadError(Notice),
}

struct SessionState {
    phase: Phase,
    selection: Option<String>,
    notice: Option<Notice>,
    submitting: bool,
    generation: u64,
    abandoned: bool,
}

impl SessionState {
    fn begin_loading(&mut self) -> u64 {
        self.generation += 1;
        self.phase = Phase::Loading;
        self.generation
    }

    fn view(&self) -> SessionView {
        match &self.phase {
            Phase::Loading => SessionView::Loading,
            Phase::Open {
                agenda,
                members,
                votes,
            } => SessionView::Open(OpenSession {
                agenda: agenda.clone(),
                members: members.clone(),
                votes: votes.clone(),
                selected_cpf: self.selection.clone(),
                already_voted: self
                    .selection
                    .as_deref()
                    .is_some_and(|cpf| has_voted(votes, cpf)),
                submitting: self.submitting,
            }),
            Phase::Closed(agenda) => SessionView::ClosedSession(agenda.clone()),
            Phase::LoadError(notice) => SessionView::LoadError(notice.clone()),
        }
    }
}

fn has_voted(votes: &[Vote], cpf: &str) -> bool {
    votes.iter().any(|vote| normalize_cpf(&vote.member_cpf) == cpf)
}

/// Merges one fetch batch. The agenda and roster are essential; a failed
/// vote-list fetch degrades to an empty list.
fn merge_batch(
    agenda: FetchOutcome<Agenda>,
    members: FetchOutcome<Vec<Member>>,
    votes: FetchOutcome<Vec<Vote>>,
) -> Phase {
    let (agenda, members) = match (agenda.into_result(), members.into_result()) {
        (Ok(agenda), Ok(members)) => (agenda, members),
        (Err(reason), _) | (_, Err(reason)) => {
            error!(%reason, "failed to load voting session");
            return Phase::LoadError(Notice::error(notice::SESSION_LOAD_FAILED));
        }
    };

    if !agenda.voting_open {
        return Phase::Closed(agenda);
    }

    Phase::Open {
        agenda,
        members,
        votes: votes.or_empty("votes"),
    }
}

pub struct SessionController {
    api: Arc<dyn VotingApi>,
    agenda_id: AgendaId,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(api: Arc<dyn VotingApi>, agenda_id: AgendaId) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            agenda_id,
            inner: Mutex::new(SessionState {
                phase: Phase::Loading,
                selection: None,
                notice: None,
                submitting: false,
                generation: 0,
                abandoned: false,
            }),
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> SessionView {
        self.inner.lock().await.view()
    }

    /// Latest message for the presentation layer, if any.
    pub async fn notice(&self) -> Option<Notice> {
        self.inner.lock().await.notice.clone()
    }

    /// Enters Loading and fetches agenda, roster and votes concurrently.
    pub async fn load(&self) -> SessionView {
        let generation = {
            let mut state = self.inner.lock().await;
            if state.abandoned {
                return state.view();
            }
            state.begin_loading()
        };
        self.emit(SessionEvent::StateChanged(SessionView::Loading));
        self.fetch(generation).await
    }

    async fn fetch(&self, generation: u64) -> SessionView {
        let (agenda, members, votes) = join3(
            self.api.get_agenda(&self.agenda_id),
            self.api.list_members(),
            self.api.list_votes(&self.agenda_id),
        )
        .await;
        let phase = merge_batch(agenda.into(), members.into(), votes.into());

        let view = {
            let mut state = self.inner.lock().await;
            if state.abandoned || state.generation != generation {
                debug!(agenda_id = %self.agenda_id, generation, "discarding stale session fetch");
                return state.view();
            }
            state.phase = phase;
            state.view()
        };
        self.emit(SessionEvent::StateChanged(view.clone()));
        view
    }

    /// Records the pending selection and clears any prior message. The cpf is
    /// reduced to its digits; one without digits clears the selection. Ignored
    /// while a submit is in flight.
    pub async fn select_member(&self, cpf: &str) -> SelectOutcome {
        let (outcome, view) = {
            let mut state = self.inner.lock().await;
            if state.abandoned || state.submitting {
                return SelectOutcome::Ignored;
            }
            let Phase::Open { votes, .. } = &state.phase else {
                return SelectOutcome::Ignored;
            };

            let cpf = normalize_cpf(cpf);
            let outcome = if cpf.is_empty() {
                SelectOutcome::Cleared
            } else {
                SelectOutcome::Selected {
                    already_voted: has_voted(votes, &cpf),
                }
            };
            state.selection = (!cpf.is_empty()).then_some(cpf);
            state.notice = None;
            (outcome, state.view())
        };
        self.emit(SessionEvent::StateChanged(view));
        outcome
    }

    pub async fn submit_vote(&self, choice: VoteValue) -> SubmitOutcome {
        let member_cpf = {
            let mut state = self.inner.lock().await;
            if state.abandoned || state.submitting {
                return SubmitOutcome::Ignored;
            }
            let Phase::Open { votes, .. } = &state.phase else {
                return SubmitOutcome::Ignored;
            };

            let refusal = match state.selection.as_deref() {
                None => Some(notice::MEMBER_REQUIRED),
                Some(cpf) if has_voted(votes, cpf) => Some(notice::DUPLICATE_VOTE),
                Some(_) => None,
            };
            if let Some(text) = refusal {
                let refused = Notice::error(text);
                state.notice = Some(refused.clone());
                drop(state);
                self.emit(SessionEvent::Notice(refused.clone()));
                return SubmitOutcome::Refused(refused);
            }

            state.submitting = true;
            state.notice = None;
            let view = state.view();
            self.emit(SessionEvent::StateChanged(view));
            state.selection.clone().unwrap_or_default()
        };

        let request = SubmitVoteRequest {
            member_cpf,
            vote_value: choice,
        };
        let result = self.api.submit_vote(&self.agenda_id, &request).await;

        let mut state = self.inner.lock().await;
        state.submitting = false;
        if state.abandoned {
            debug!(agenda_id = %self.agenda_id, "discarding vote result for abandoned session");
            return match result {
                Ok(()) => SubmitOutcome::Registered(choice),
                Err(err) => SubmitOutcome::Failed(Notice::from_api_error(&err, notice::VOTE_FAILED)),
            };
        }

        match result {
            Ok(()) => {
                info!(agenda_id = %self.agenda_id, vote = %choice, "vote registered");
                let registered = Notice::success(format!("Vote \"{choice}\" registered successfully!"));
                state.notice = Some(registered.clone());
                state.selection = None;
                let generation = state.begin_loading();
                drop(state);

                self.emit(SessionEvent::Notice(registered));
                self.emit(SessionEvent::StateChanged(SessionView::Loading));
                self.fetch(generation).await;
                SubmitOutcome::Registered(choice)
            }
            Err(err) => {
                warn!(agenda_id = %self.agenda_id, error = %err, "vote submission failed");
                let failed = Notice::from_api_error(&err, notice::VOTE_FAILED);
                state.notice = Some(failed.clone());
                let view = state.view();
                drop(state);

                self.emit(SessionEvent::Notice(failed.clone()));
                self.emit(SessionEvent::StateChanged(view));
                SubmitOutcome::Failed(failed)
            }
        }
    }

    /// Detaches the view. Results that arrive afterwards are dropped.
    pub async fn abandon(&self) {
        self.inner.lock().await.abandoned = true;
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
