//! Highlight persistence

use async_trait::async_trait;

use super::{check, read_json, Session};
use crate::error::Result;
use crate::model::{Highlight, HighlightPatch, NewHighlight};

/// Highlight persistence backend.
///
/// Callers mutate local state only after a call succeeds.
#[async_trait]
pub trait HighlightService: Send + Sync {
    /// Persist a new highlight; the server fills in `id` and owner
    async fn create(&self, highlight: &NewHighlight) -> Result<Highlight>;

    /// Every highlight the caller owns on a document, in creation order
    async fn fetch_for_document(&self, document_id: &str) -> Result<Vec<Highlight>>;

    async fn update(&self, id: &str, patch: &HighlightPatch) -> Result<Highlight>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// HTTP implementation against `/api/highlight`
pub struct HighlightClient {
    http: reqwest::Client,
    session: Session,
}

impl HighlightClient {
    pub fn new(session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn item_url(&self, key: &str) -> String {
        self.session
            .url(&format!("/api/highlight/{}", urlencoding::encode(key)))
    }
}

#[async_trait]
impl HighlightService for HighlightClient {
    async fn create(&self, highlight: &NewHighlight) -> Result<Highlight> {
        let request = self
            .http
            .post(self.session.url("/api/highlight"))
            .json(highlight);
        let response = self.session.authorize(request).send().await?;
        let created: Highlight = read_json(response).await?;

        tracing::debug!(id = %created.id, page = created.page, "Highlight saved");
        Ok(created)
    }

    async fn fetch_for_document(&self, document_id: &str) -> Result<Vec<Highlight>> {
        let request = self.http.get(self.item_url(document_id));
        let response = self.session.authorize(request).send().await?;
        read_json(response).await
    }

    async fn update(&self, id: &str, patch: &HighlightPatch) -> Result<Highlight> {
        let request = self.http.put(self.item_url(id)).json(patch);
        let response = self.session.authorize(request).send().await?;
        read_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self.http.delete(self.item_url(id));
        let response = self.session.authorize(request).send().await?;
        check(response).await?;
        Ok(())
    }
}
