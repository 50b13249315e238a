use serde::{Deserialize, Serialize};

/// Error payload returned by the backend on 4xx/5xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message, if present and not blank.
    pub fn into_message(self) -> Option<String> {
        self.message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
