//! Client error types

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Missing, invalid, or expired session token
    #[error("Authentication required: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure, non-2xx response, or unreadable body
    #[error("Request failed: {0}")]
    Persistence(String),

    #[error("Render failed: {0}")]
    Render(String),
}

impl ClientError {
    /// Classify a non-success response; only 401 asks the user to log in
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            // 403 comes from storage permissions, not from the session
            StatusCode::UNAUTHORIZED => ClientError::Auth(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Persistence(format!("{}: {}", status, message)),
        }
    }

    /// Text for the transient notice shown to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Auth(_) => "Please log in to continue".to_string(),
            ClientError::NotFound(msg) => format!("Not found: {}", msg),
            ClientError::Persistence(msg) => format!("Could not save changes: {}", msg),
            ClientError::Render(msg) => format!("Could not display document: {}", msg),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Persistence(err.to_string())
    }
}
