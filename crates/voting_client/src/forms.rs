//! Agenda and member creation flows.

use shared::{
    domain::AgendaId,
    protocol::{CreateAgendaRequest, CreateMemberRequest},
};
use tracing::{info, warn};

use crate::{
    api::VotingApi,
    notice::{self, Notice},
    validation::{
        required_text, validate_cpf, ValidationError, DESCRIPTION_MAX_CHARS,
        MEMBER_NAME_MAX_CHARS, TITLE_MAX_CHARS,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<T> {
    Created(T, Notice),
    /// Local validation failed; nothing was sent.
    Invalid(Notice),
    Failed(Notice),
}

impl<T> FormOutcome<T> {
    pub fn notice(&self) -> &Notice {
        match self {
            Self::Created(_, notice) | Self::Invalid(notice) | Self::Failed(notice) => notice,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgendaDraft {
    pub title: String,
    pub description: String,
}

impl AgendaDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> Result<CreateAgendaRequest, ValidationError> {
        Ok(CreateAgendaRequest {
            title: required_text("title", &self.title, TITLE_MAX_CHARS)?,
            description: required_text("description", &self.description, DESCRIPTION_MAX_CHARS)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDraft {
    pub cpf: String,
    pub name: String,
}

impl MemberDraft {
    pub fn new(cpf: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            cpf: cpf.into(),
            name: name.into(),
        }
    }

    /// Name first, then cpf. The request carries the trimmed name and the
    /// digits-only cpf.
    pub fn validate(&self) -> Result<CreateMemberRequest, ValidationError> {
        let name = required_text("name", &self.name, MEMBER_NAME_MAX_CHARS)?;
        let cpf = validate_cpf(&self.cpf)?;
        Ok(CreateMemberRequest { cpf, name })
    }
}

pub async fn submit_agenda(api: &dyn VotingApi, draft: &AgendaDraft) -> FormOutcome<AgendaId> {
    let request = match draft.validate() {
        Ok(request) => request,
        Err(err) => return FormOutcome::Invalid(Notice::error(err.to_string())),
    };

    match api.create_agenda(&request).await {
        Ok(created) => {
            info!(agenda_id = %created.id, "agenda created");
            FormOutcome::Created(created.id, Notice::success("Agenda created successfully!"))
        }
        Err(err) => {
            warn!(error = %err, "failed to create agenda");
            FormOutcome::Failed(Notice::from_api_error(&err, notice::AGENDA_CREATE_FAILED))
        }
    }
}

pub async fn submit_member(api: &dyn VotingApi, draft: &MemberDraft) -> FormOutcome<String> {
    let request = match draft.validate() {
        Ok(request) => request,
        Err(err) => return FormOutcome::Invalid(Notice::error(err.to_string())),
    };

    match api.create_member(&request).await {
        Ok(()) => {
            info!("member registered");
            FormOutcome::Created(request.cpf, Notice::success("Member registered successfully!"))
        }
        Err(err) => {
            warn!(error = %err, "failed to register member");
            FormOutcome::Failed(Notice::from_api_error(&err, notice::MEMBER_CREATE_FAILED))
        }
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
