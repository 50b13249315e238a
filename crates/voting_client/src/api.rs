//! HTTP contract with the voting backend.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::AgendaId,
    error::ApiErrorBody,
    protocol::{
        Agenda, CreateAgendaRequest, CreateAgendaResponse, CreateMemberRequest, Member,
        OpenSessionRequest, SubmitVoteRequest, Vote, VotingResultData,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiCallError {
    /// No response reached the client.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("backend rejected request with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiCallError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Backend-provided message when there is one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiCallError>;

/// Result of one sub-request in a concurrent fetch batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failed(String),
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failed(reason) => Err(reason),
        }
    }
}

impl<T: Default> FetchOutcome<T> {
    /// Degrades a failed non-essential fetch to an empty value.
    pub fn or_empty(self, resource: &str) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failed(reason) => {
                warn!(resource, %reason, "fetch failed, continuing with empty value");
                T::default()
            }
        }
    }
}

impl<T> From<ApiResult<T>> for FetchOutcome<T> {
    fn from(result: ApiResult<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

#[async_trait]
pub trait VotingApi: Send + Sync {
    async fn list_agendas(&self) -> ApiResult<Vec<Agenda>>;
    async fn get_agenda(&self, agenda_id: &AgendaId) -> ApiResult<Agenda>;
    async fn open_voting_session(
        &self,
        agenda_id: &AgendaId,
        request: OpenSessionRequest,
    ) -> ApiResult<()>;
    async fn create_agenda(&self, request: &CreateAgendaRequest)
        -> ApiResult<CreateAgendaResponse>;
    async fn list_members(&self) -> ApiResult<Vec<Member>>;
    async fn create_member(&self, request: &CreateMemberRequest) -> ApiResult<()>;
    async fn list_votes(&self, agenda_id: &AgendaId) -> ApiResult<Vec<Vote>>;
    async fn submit_vote(&self, agenda_id: &AgendaId, request: &SubmitVoteRequest)
        -> ApiResult<()>;
    async fn get_result(&self, agenda_id: &AgendaId) -> ApiResult<VotingResultData>;
}

pub struct HttpVotingApi {
    http: Client,
    base_url: String,
}

impl HttpVotingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: trim_base_url(base_url.into()),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: trim_base_url(settings.api_base_url.clone()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ApiCallError::from_reqwest)?;
        decode_json(ensure_success(response).await?).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        // A null body is an empty list.
        let items: Option<Vec<T>> = self.get_json(path).await?;
        Ok(items.unwrap_or_default())
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> ApiResult<Response> {
        let url = self.endpoint(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiCallError::from_reqwest)?;
        ensure_success(response).await
    }
}

fn trim_base_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message);
    debug!(status = status.as_u16(), ?message, "request rejected");
    Err(ApiCallError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await.map_err(ApiCallError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiCallError::Decode(err.to_string()))
}

#[async_trait]
impl VotingApi for HttpVotingApi {
    async fn list_agendas(&self) -> ApiResult<Vec<Agenda>> {
        self.get_list("/agendas/v1").await
    }

    async fn get_agenda(&self, agenda_id: &AgendaId) -> ApiResult<Agenda> {
        self.get_json(&format!("/agendas/v1/{agenda_id}")).await
    }

    async fn open_voting_session(
        &self,
        agenda_id: &AgendaId,
        request: OpenSessionRequest,
    ) -> ApiResult<()> {
        self.post(&format!("/agendas/v1/{agenda_id}/voting-session"), &request)
            .await?;
        Ok(())
    }

    async fn create_agenda(
        &self,
        request: &CreateAgendaRequest,
    ) -> ApiResult<CreateAgendaResponse> {
        let response = self.post("/agendas/v1", request).await?;
        decode_json(response).await
    }

    async fn list_members(&self) -> ApiResult<Vec<Member>> {
        self.get_list("/members/v1").await
    }

    async fn create_member(&self, request: &CreateMemberRequest) -> ApiResult<()> {
        self.post("/members/v1", request).await?;
        Ok(())
    }

    async fn list_votes(&self, agenda_id: &AgendaId) -> ApiResult<Vec<Vote>> {
        self.get_list(&format!("/agendas/v1/{agenda_id}/votes")).await
    }

    async fn submit_vote(
        &self,
        agenda_id: &AgendaId,
        request: &SubmitVoteRequest,
    ) -> ApiResult<()> {
        self.post(&format!("/agendas/v1/{agenda_id}/votes"), request)
            .await?;
        Ok(())
    }

    async fn get_result(&self, agenda_id: &AgendaId) -> ApiResult<VotingResultData> {
        self.get_json(&format!("/agendas/v1/{agenda_id}/result")).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
