use super::*;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::VoteValue;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct ServerState {
    posted: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn record(state: &ServerState, path: String, body: Value) {
    state.posted.lock().await.push((path, body));
}

async fn handle_agenda(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Agenda not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id.parse::<i64>().unwrap_or_default(),
            "title": "Test Agenda",
            "description": "Test agenda description",
            "createdAt": "2024-01-01T00:00:00Z",
            "status": "OPEN",
            "votingOpen": true,
            "sessionEndTime": "2024-01-01T10:05:00Z"
        })),
    )
}

async fn handle_submit_vote(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, format!("/agendas/v1/{id}/votes"), body.clone()).await;
    if body["memberCpf"] == "12345678900" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Member already voted on this agenda"})),
        );
    }
    (StatusCode::OK, Json(json!({})))
}

async fn handle_open_session(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&state, format!("/agendas/v1/{id}/voting-session"), body).await;
    StatusCode::OK
}

async fn handle_create_agenda(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&state, "/agendas/v1".into(), body).await;
    Json(json!({"id": 7, "title": "ignored"}))
}

async fn handle_create_member(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> StatusCode {
    record(&state, "/members/v1".into(), body).await;
    StatusCode::CONFLICT
}

async fn spawn_backend() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let api = Router::new()
        .route(
            "/agendas/v1",
            get(|| async { Json(json!([{"id": "1", "title": "A", "status": "CLOSED"}])) })
                .post(handle_create_agenda),
        )
        .route("/agendas/v1/:id", get(handle_agenda))
        .route("/agendas/v1/:id/voting-session", post(handle_open_session))
        .route(
            "/agendas/v1/:id/votes",
            get(|| async { Json(Value::Null) }).post(handle_submit_vote),
        )
        .route(
            "/agendas/v1/:id/result",
            get(|| async { Json(json!({"yesVotes": 3, "noVotes": 2, "totalVotes": 5})) }),
        )
        .route(
            "/members/v1",
            get(|| async { Json(json!([{"id": 1, "cpf": "12345678900", "name": "Ana"}])) })
                .post(handle_create_member),
        )
        .with_state(state.clone());
    let app = Router::new().nest("/api", api);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api/"), state))
}

#[tokio::test]
async fn fetches_agenda_and_normalizes_numeric_id() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let agenda = api.get_agenda(&AgendaId::from("42")).await.expect("agenda");
    assert_eq!(agenda.id, AgendaId::from("42"));
    assert!(agenda.voting_open);
}

#[tokio::test]
async fn lists_agendas_and_members() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let agendas = api.list_agendas().await.expect("agendas");
    assert_eq!(agendas.len(), 1);
    assert!(!agendas[0].voting_open);

    let members = api.list_members().await.expect("members");
    assert_eq!(members[0].cpf, "12345678900");
}

#[tokio::test]
async fn null_vote_list_decodes_as_empty() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let votes = api.list_votes(&AgendaId::from("1")).await.expect("votes");
    assert!(votes.is_empty());
}

#[tokio::test]
async fn result_decodes_tally() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let tally = api.get_result(&AgendaId::from("1")).await.expect("tally");
    assert_eq!(tally, VotingResultData::new(3, 2));
}

#[tokio::test]
async fn not_found_carries_backend_message() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let err = api
        .get_agenda(&AgendaId::from("missing"))
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiCallError::rejected(404, "Agenda not found"));
    assert_eq!(err.user_message("fallback"), "Agenda not found");
}

#[tokio::test]
async fn submit_vote_posts_cpf_contract() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    api.submit_vote(
        &AgendaId::from("1"),
        &SubmitVoteRequest {
            member_cpf: "12345678901".into(),
            vote_value: VoteValue::Sim,
        },
    )
    .await
    .expect("vote accepted");

    let posted = state.posted.lock().await.clone();
    assert_eq!(posted[0].0, "/agendas/v1/1/votes");
    assert_eq!(
        posted[0].1,
        json!({"memberCpf": "12345678901", "voteValue": "SIM"})
    );
}

#[tokio::test]
async fn rejected_vote_surfaces_backend_message() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let err = api
        .submit_vote(
            &AgendaId::from("1"),
            &SubmitVoteRequest {
                member_cpf: "12345678900".into(),
                vote_value: VoteValue::Nao,
            },
        )
        .await
        .expect_err("must fail");
    assert_eq!(err.backend_message(), Some("Member already voted on this agenda"));
}

#[tokio::test]
async fn rejection_without_body_has_no_message() {
    let (base_url, _) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    let err = api
        .create_member(&CreateMemberRequest {
            cpf: "12345678900".into(),
            name: "Ana".into(),
        })
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ApiCallError::Rejected {
            status: 409,
            message: None
        }
    );
    assert_eq!(err.user_message("Failed to save member"), "Failed to save member");
}

#[tokio::test]
async fn open_session_and_create_agenda_bodies() {
    let (base_url, state) = spawn_backend().await.expect("spawn backend");
    let api = HttpVotingApi::new(base_url);

    api.open_voting_session(&AgendaId::from("3"), OpenSessionRequest::new(None))
        .await
        .expect("opened");
    let created = api
        .create_agenda(&CreateAgendaRequest {
            title: "Title".into(),
            description: "Description".into(),
        })
        .await
        .expect("created");
    assert_eq!(created.id, AgendaId::from("7"));

    let posted = state.posted.lock().await.clone();
    assert_eq!(
        posted[0],
        (
            "/agendas/v1/3/voting-session".to_string(),
            json!({"durationMinutes": 1})
        )
    );
    assert_eq!(
        posted[1].1,
        json!({"title": "Title", "description": "Description"})
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = HttpVotingApi::new(format!("http://{addr}/api"));
    let err = api.list_agendas().await.expect_err("must fail");
    assert!(matches!(err, ApiCallError::Transport(_)), "unexpected: {err:?}");
    assert_eq!(err.user_message("generic"), "generic");
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let api = HttpVotingApi::new("http://localhost:8080/api/ ");
    assert_eq!(api.base_url(), "http://localhost:8080/api");
    assert_eq!(api.endpoint("/members/v1"), "http://localhost:8080/api/members/v1");
}

#[test]
fn fetch_outcome_degrades_to_empty() {
    let failed = FetchOutcome::from(Err::<Vec<u8>, _>(ApiCallError::Transport("down".into())));
    assert!(!failed.is_success());
    assert!(failed.or_empty("votes").is_empty());

    let ok = FetchOutcome::from(Ok::<_, ApiCallError>(vec![1u8, 2]));
    assert_eq!(ok.into_result(), Ok(vec![1, 2]));
}
