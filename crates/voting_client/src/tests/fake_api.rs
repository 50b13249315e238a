//! In-memory `VotingApi` used by controller tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{AgendaId, AgendaStatus, MemberId, Timestamp, VoteValue},
    protocol::{
        Agenda, CreateAgendaRequest, CreateAgendaResponse, CreateMemberRequest, Member,
        OpenSessionRequest, SubmitVoteRequest, Vote, VotingResultData,
    },
};
use tokio::sync::Notify;

use crate::api::{ApiCallError, ApiResult, VotingApi};

pub(crate) fn agenda(id: &str, voting_open: bool) -> Agenda {
    Agenda {
        id: AgendaId::from(id),
        title: "Test Agenda".into(),
        description: "Test agenda description".into(),
        created_at: Some(Timestamp::from("2024-01-01T00:00:00Z")),
        status: if voting_open {
            AgendaStatus::Open
        } else {
            AgendaStatus::Closed
        },
        voting_open,
        session_start_time: voting_open.then(|| Timestamp::from("2024-01-01T10:00:00Z")),
        session_end_time: voting_open.then(|| Timestamp::from("2024-01-01T10:05:00Z")),
    }
}

pub(crate) fn member(id: &str, cpf: &str, name: &str) -> Member {
    Member {
        id: MemberId::from(id),
        cpf: cpf.into(),
        name: name.into(),
        created_at: None,
    }
}

pub(crate) fn vote(cpf: &str, name: &str, value: VoteValue) -> Vote {
    Vote {
        member_cpf: cpf.into(),
        member_name: name.into(),
        vote_value: value,
        voted_at: Some(Timestamp::from("2024-01-01T10:01:00Z")),
    }
}

pub(crate) fn transport_error() -> ApiCallError {
    ApiCallError::Transport("connection refused".into())
}

pub(crate) struct FakeApi {
    pub agendas: Mutex<ApiResult<Vec<Agenda>>>,
    pub agenda: Mutex<ApiResult<Agenda>>,
    pub members: Mutex<ApiResult<Vec<Member>>>,
    pub votes: Mutex<ApiResult<Vec<Vote>>>,
    pub result: Mutex<ApiResult<VotingResultData>>,
    pub submit_response: Mutex<ApiResult<()>>,
    pub open_session_response: Mutex<ApiResult<()>>,
    pub create_agenda_response: Mutex<ApiResult<CreateAgendaResponse>>,
    pub create_member_response: Mutex<ApiResult<()>>,
    pub submitted: Mutex<Vec<SubmitVoteRequest>>,
    pub opened: Mutex<Vec<(AgendaId, OpenSessionRequest)>>,
    pub created_agendas: Mutex<Vec<CreateAgendaRequest>>,
    pub created_members: Mutex<Vec<CreateMemberRequest>>,
    pub agenda_fetches: Mutex<u32>,
    /// Successful submissions are appended to `votes`, as the backend would.
    pub record_votes: bool,
    submit_gate: Option<Arc<Notify>>,
    submit_started: Arc<Notify>,
}

impl FakeApi {
    pub fn open_session() -> Self {
        Self::with_agenda(agenda("1", true))
    }

    pub fn with_agenda(agenda: Agenda) -> Self {
        Self {
            agendas: Mutex::new(Ok(vec![agenda.clone()])),
            agenda: Mutex::new(Ok(agenda)),
            members: Mutex::new(Ok(vec![
                member("1", "12345678900", "Test Member 1"),
                member("2", "12345678901", "Test Member 2"),
                member("3", "12345678902", "Test Member 3"),
            ])),
            votes: Mutex::new(Ok(Vec::new())),
            result: Mutex::new(Ok(VotingResultData::new(3, 2))),
            submit_response: Mutex::new(Ok(())),
            open_session_response: Mutex::new(Ok(())),
            create_agenda_response: Mutex::new(Ok(CreateAgendaResponse {
                id: AgendaId::from("99"),
            })),
            create_member_response: Mutex::new(Ok(())),
            submitted: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            created_agendas: Mutex::new(Vec::new()),
            created_members: Mutex::new(Vec::new()),
            agenda_fetches: Mutex::new(0),
            record_votes: true,
            submit_gate: None,
            submit_started: Arc::new(Notify::new()),
        }
    }

    pub fn with_votes(self, votes: Vec<Vote>) -> Self {
        *self.votes.lock().unwrap() = Ok(votes);
        self
    }

    /// Submissions block until [`FakeApi::release_submit`] is called.
    pub fn with_submit_gate(mut self) -> Self {
        self.submit_gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn set<T>(slot: &Mutex<ApiResult<T>>, value: ApiResult<T>) {
        *slot.lock().unwrap() = value;
    }

    pub async fn wait_submit_started(&self) {
        self.submit_started.notified().await;
    }

    pub fn release_submit(&self) {
        if let Some(gate) = &self.submit_gate {
            gate.notify_one();
        }
    }

    pub fn submitted(&self) -> Vec<SubmitVoteRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn agenda_fetches(&self) -> u32 {
        *self.agenda_fetches.lock().unwrap()
    }
}

#[async_trait]
impl VotingApi for FakeApi {
    async fn list_agendas(&self) -> ApiResult<Vec<Agenda>> {
        self.agendas.lock().unwrap().clone()
    }

    async fn get_agenda(&self, _agenda_id: &AgendaId) -> ApiResult<Agenda> {
        *self.agenda_fetches.lock().unwrap() += 1;
        self.agenda.lock().unwrap().clone()
    }

    async fn open_voting_session(
        &self,
        agenda_id: &AgendaId,
        request: OpenSessionRequest,
    ) -> ApiResult<()> {
        self.opened
            .lock()
            .unwrap()
            .push((agenda_id.clone(), request));
        self.open_session_response.lock().unwrap().clone()
    }

    async fn create_agenda(
        &self,
        request: &CreateAgendaRequest,
    ) -> ApiResult<CreateAgendaResponse> {
        self.created_agendas.lock().unwrap().push(request.clone());
        self.create_agenda_response.lock().unwrap().clone()
    }

    async fn list_members(&self) -> ApiResult<Vec<Member>> {
        self.members.lock().unwrap().clone()
    }

    async fn create_member(&self, request: &CreateMemberRequest) -> ApiResult<()> {
        self.created_members.lock().unwrap().push(request.clone());
        self.create_member_response.lock().unwrap().clone()
    }

    async fn list_votes(&self, _agenda_id: &AgendaId) -> ApiResult<Vec<Vote>> {
        self.votes.lock().unwrap().clone()
    }

    async fn submit_vote(
        &self,
        _agenda_id: &AgendaId,
        request: &SubmitVoteRequest,
    ) -> ApiResult<()> {
        self.submitted.lock().unwrap().push(request.clone());
        self.submit_started.notify_one();
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }

        let response = self.submit_response.lock().unwrap().clone();
        if response.is_ok() && self.record_votes {
            let name = match &*self.members.lock().unwrap() {
                Ok(members) => members
                    .iter()
                    .find(|m| m.cpf == request.member_cpf)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                Err(_) => String::new(),
            };
            if let Ok(votes) = &mut *self.votes.lock().unwrap() {
                votes.push(vote(&request.member_cpf, &name, request.vote_value));
            }
        }
        response
    }

    async fn get_result(&self, _agenda_id: &AgendaId) -> ApiResult<VotingResultData> {
        self.result.lock().unwrap().clone()
    }
}
