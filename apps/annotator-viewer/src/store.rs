//! In-memory highlights for the open document

use crate::client::HighlightService;
use crate::error::Result;
use crate::model::Highlight;

/// Server-confirmed highlights of a single document, in insertion order
#[derive(Debug, Default)]
pub struct HighlightStore {
    document_id: Option<String>,
    highlights: Vec<Highlight>,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole set with the server's highlights for `document_id`.
    ///
    /// On failure the store is left empty for that document and the error is
    /// returned for the caller to report.
    pub async fn load(&mut self, document_id: &str, service: &dyn HighlightService) -> Result<usize> {
        self.document_id = Some(document_id.to_string());
        self.highlights.clear();

        match service.fetch_for_document(document_id).await {
            Ok(highlights) => {
                self.highlights = highlights
                    .into_iter()
                    .filter(|h| h.document_id == document_id)
                    .collect();
                tracing::debug!(
                    document_id = %document_id,
                    count = self.highlights.len(),
                    "Highlights loaded"
                );
                Ok(self.highlights.len())
            }
            Err(e) => {
                tracing::warn!(document_id = %document_id, "Failed to load highlights: {}", e);
                Err(e)
            }
        }
    }

    /// Append a confirmed record; rejected if it belongs to another document
    pub fn add(&mut self, highlight: Highlight) -> bool {
        if self.document_id.as_deref() != Some(highlight.document_id.as_str()) {
            tracing::debug!(
                id = %highlight.id,
                document_id = %highlight.document_id,
                "Dropping highlight for a document that is not open"
            );
            return false;
        }
        self.highlights.push(highlight);
        true
    }

    /// Remove by id; absent ids are a no-op
    pub fn remove(&mut self, id: &str) -> Option<Highlight> {
        let index = self.highlights.iter().position(|h| h.id == id)?;
        Some(self.highlights.remove(index))
    }

    /// Highlights on `page`, oldest first so later ones draw on top
    pub fn for_page(&self, page: u32) -> Vec<&Highlight> {
        self.highlights.iter().filter(|h| h.page == page).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id == id)
    }

    pub fn clear(&mut self) {
        self.document_id = None;
        self.highlights.clear();
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }
}
