//! HTTP clients for the annotator server
//!
//! Each client is built from a [`Session`] and owns a `reqwest::Client`.
//! Responses are classified into [`ClientError`] the same way everywhere.

mod auth;
mod documents;
mod highlights;
mod session;

pub use auth::AuthClient;
pub use documents::DocumentClient;
pub use highlights::{HighlightClient, HighlightService};
pub use session::Session;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ClientError, Result};

/// Error body the server returns with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pass 2xx responses through, classify the rest
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    };

    tracing::debug!(status = %status, message = %message, "Request rejected");
    Err(ClientError::from_status(status, message))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Persistence(format!("Failed to parse response: {}", e)))
}
