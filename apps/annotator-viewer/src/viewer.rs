//! Document viewer interaction state
//!
//! Owns the open document, zoom and page, the highlight store, and the
//! selection-to-highlight flow:
//!
//! ```text
//! Idle --begin_selection--> Selecting --begin_capture--> Capturing --finish_capture--> Idle
//! ```
//!
//! Zoom and page are independent of that state and may change while a
//! capture is in flight. A capture is normalized against the zoom and page at
//! the moment the selection is taken. Several captures may be in flight at
//! once; the viewer reports `Capturing` until the last one finishes.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::client::HighlightService;
use crate::error::ClientError;
use crate::geometry::{clamp_scale, to_document_space, to_screen_space, ScreenRect};
use crate::model::{Highlight, NewHighlight};
use crate::notice::{Notices, DEFAULT_NOTICE_TTL};
use crate::selection::SelectionSource;
use crate::store::HighlightStore;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub default_zoom: f64,
    /// Increment for `zoom_in` / `zoom_out`
    pub zoom_step: f64,
    pub notice_ttl: Duration,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            zoom_step: 0.25,
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    /// Drag in progress
    Selecting,
    /// Create request in flight
    Capturing,
}

/// Keyboard modifiers held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// A highlight positioned on the current page at the current zoom
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: String,
    pub text: String,
    pub rect: ScreenRect,
}

/// A normalized selection waiting for the server to confirm it
#[derive(Debug, Clone)]
pub struct PendingCapture {
    request: NewHighlight,
}

impl PendingCapture {
    pub fn request(&self) -> &NewHighlight {
        &self.request
    }
}

#[derive(Debug, Clone)]
struct OpenDocument {
    id: String,
    num_pages: u32,
}

pub struct DocumentViewer {
    service: Arc<dyn HighlightService>,
    config: ViewerConfig,
    document: Option<OpenDocument>,
    store: HighlightStore,
    zoom: f64,
    current_page: u32,
    selecting: bool,
    /// Captures begun but not yet finished
    in_flight: usize,
    render_error: Option<ClientError>,
    notices: Notices,
}

impl DocumentViewer {
    pub fn new(service: Arc<dyn HighlightService>, config: ViewerConfig) -> Self {
        let zoom = clamp_scale(config.default_zoom);
        let notices = Notices::with_ttl(config.notice_ttl);
        Self {
            service,
            config,
            document: None,
            store: HighlightStore::new(),
            zoom,
            current_page: 1,
            selecting: false,
            in_flight: 0,
            render_error: None,
            notices,
        }
    }

    /// Switch to a document and load its highlights.
    ///
    /// A failed load leaves the document open with no highlights.
    pub async fn open_document(&mut self, document_id: &str, num_pages: u32) {
        self.document = Some(OpenDocument {
            id: document_id.to_string(),
            num_pages: num_pages.max(1),
        });
        self.current_page = 1;
        self.selecting = false;
        self.render_error = None;

        tracing::info!(document_id = %document_id, num_pages, "Opening document");

        if let Err(e) = self.store.load(document_id, self.service.as_ref()).await {
            self.notices.report(&e);
        }
    }

    pub fn close_document(&mut self) {
        self.document = None;
        self.store.clear();
        self.selecting = false;
        self.render_error = None;
    }

    /// The page could not be rendered; the viewer stays usable
    pub fn on_load_error(&mut self, err: impl Display) {
        let err = ClientError::Render(err.to_string());
        tracing::error!("Failed to render document: {}", err);
        self.notices.report(&err);
        self.render_error = Some(err);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_scale(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.config.zoom_step);
    }

    /// Clamped into `[1, num_pages]`; ignored with no document open
    pub fn set_page(&mut self, page: u32) {
        if let Some(doc) = &self.document {
            self.current_page = page.clamp(1, doc.num_pages);
        }
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.current_page.saturating_sub(1));
    }

    /// Mouse-down on the page; allowed while earlier captures are pending
    pub fn begin_selection(&mut self) {
        if self.document.is_some() {
            self.selecting = true;
        }
    }

    /// Mouse-up: normalize the active selection into a create request.
    ///
    /// Returns `None` when there is nothing to capture: no open document,
    /// empty text, a zero-area rectangle, or no rendered canvas.
    pub fn begin_capture(&mut self, source: &mut dyn SelectionSource) -> Option<PendingCapture> {
        self.selecting = false;

        let document_id = self.document.as_ref()?.id.clone();

        let text = source.selected_text();
        if text.trim().is_empty() {
            return None;
        }
        let selection = source.active_selection_rect()?;
        if selection.is_empty() {
            return None;
        }

        let Some(canvas) = source.canvas_rect() else {
            tracing::debug!("No canvas for selection, skipping capture");
            source.clear_selection();
            return None;
        };

        let bounding_box = to_document_space(&selection, &canvas, self.zoom)?;
        source.clear_selection();
        self.in_flight += 1;

        Some(PendingCapture {
            request: NewHighlight {
                document_id,
                page: self.current_page,
                text: text.trim().to_string(),
                bounding_box,
                created_at: Some(Utc::now()),
            },
        })
    }

    /// Apply the server's answer to a capture; true if a highlight was added
    pub fn finish_capture(
        &mut self,
        pending: PendingCapture,
        result: Result<Highlight, ClientError>,
    ) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            Ok(highlight) => {
                tracing::debug!(
                    id = %highlight.id,
                    document_id = %pending.request.document_id,
                    "Highlight captured"
                );
                self.store.add(highlight)
            }
            Err(e) => {
                tracing::warn!("Failed to save highlight: {}", e);
                self.notices.report(&e);
                false
            }
        }
    }

    /// `begin_capture`, persist, then `finish_capture`
    pub async fn capture(&mut self, source: &mut dyn SelectionSource) -> bool {
        let Some(pending) = self.begin_capture(source) else {
            return false;
        };
        let result = self.service.create(pending.request()).await;
        self.finish_capture(pending, result)
    }

    /// Shift-click removal; the local entry goes only after the server confirms
    pub async fn remove_highlight(&mut self, id: &str, modifiers: Modifiers) -> bool {
        if !modifiers.shift || self.store.get(id).is_none() {
            return false;
        }

        match self.service.delete(id).await {
            Ok(()) => {
                self.store.remove(id);
                tracing::debug!(id = %id, "Highlight removed");
                true
            }
            Err(e) => {
                tracing::warn!(id = %id, "Failed to delete highlight: {}", e);
                self.notices.report(&e);
                false
            }
        }
    }

    /// Current page's highlights at the current zoom, oldest first
    pub fn overlays(&self) -> Vec<Overlay> {
        if self.document.is_none() || self.render_error.is_some() {
            return Vec::new();
        }

        self.store
            .for_page(self.current_page)
            .into_iter()
            .map(|h| Overlay {
                id: h.id.clone(),
                text: h.text.clone(),
                rect: to_screen_space(&h.bounding_box, self.zoom),
            })
            .collect()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn prune_notices(&mut self) -> bool {
        self.notices.prune()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn num_pages(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.num_pages)
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.id.as_str())
    }

    pub fn state(&self) -> InteractionState {
        if self.in_flight > 0 {
            InteractionState::Capturing
        } else if self.selecting {
            InteractionState::Selecting
        } else {
            InteractionState::Idle
        }
    }

    pub fn render_error(&self) -> Option<&ClientError> {
        self.render_error.as_ref()
    }

    pub fn store(&self) -> &HighlightStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::geometry::{BoundingBox, Rect};
    use crate::model::HighlightPatch;
    use crate::notice::NoticeLevel;
    use crate::selection::FixedSelection;
    use crate::store::tests::highlight;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory backend with switchable failures
    #[derive(Default)]
    struct MockHighlightService {
        saved: Mutex<Vec<Highlight>>,
        fail_create: bool,
        fail_fetch: bool,
        fail_delete: bool,
        next_id: AtomicUsize,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl HighlightService for MockHighlightService {
        async fn create(&self, request: &NewHighlight) -> Result<Highlight> {
            if self.fail_create {
                return Err(ClientError::Persistence("network unreachable".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let created = Highlight {
                id: format!("h{}", id),
                user: "user-1".to_string(),
                document_id: request.document_id.clone(),
                page: request.page,
                text: request.text.clone(),
                bounding_box: request.bounding_box,
                created_at: request.created_at.unwrap_or_else(Utc::now),
            };
            self.saved.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn fetch_for_document(&self, document_id: &str) -> Result<Vec<Highlight>> {
            if self.fail_fetch {
                return Err(ClientError::Auth("Invalid token".to_string()));
            }
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.document_id == document_id)
                .cloned()
                .collect())
        }

        async fn update(&self, _id: &str, _patch: &HighlightPatch) -> Result<Highlight> {
            Err(ClientError::Persistence("unsupported".to_string()))
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                return Err(ClientError::Persistence("network unreachable".to_string()));
            }
            self.saved.lock().unwrap().retain(|h| h.id != id);
            Ok(())
        }
    }

    fn viewer_with(service: MockHighlightService) -> (DocumentViewer, Arc<MockHighlightService>) {
        let service = Arc::new(service);
        let viewer = DocumentViewer::new(service.clone(), ViewerConfig::default());
        (viewer, service)
    }

    fn selection() -> FixedSelection {
        FixedSelection::new(
            Rect::new(110.0, 210.0, 100.0, 20.0),
            "quoted text",
            Rect::new(10.0, 10.0, 600.0, 800.0),
        )
    }

    #[tokio::test]
    async fn test_capture_adds_normalized_highlight() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 5).await;
        viewer.set_page(2);

        viewer.begin_selection();
        assert_eq!(viewer.state(), InteractionState::Selecting);

        let mut source = selection();
        assert!(viewer.capture(&mut source).await);
        assert!(source.is_cleared());
        assert_eq!(viewer.state(), InteractionState::Idle);

        let on_page = viewer.store().for_page(2);
        assert_eq!(on_page.len(), 1);
        assert_eq!(
            on_page[0].bounding_box,
            BoundingBox {
                x: 100.0,
                y: 200.0,
                width: 100.0,
                height: 20.0
            }
        );
        assert!(viewer.store().for_page(1).is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_leaves_store_unchanged() {
        let (mut viewer, _) = viewer_with(MockHighlightService {
            fail_create: true,
            ..Default::default()
        });
        viewer.open_document("doc-1", 3).await;
        let before = viewer.store().len();

        let mut source = selection();
        assert!(!viewer.capture(&mut source).await);

        assert_eq!(viewer.store().len(), before);
        assert!(source.is_cleared());
        assert_eq!(viewer.state(), InteractionState::Idle);
        assert_eq!(viewer.notices().latest().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_remove_unknown_id_is_noop() {
        let (mut viewer, service) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;
        viewer.capture(&mut selection()).await;

        assert!(!viewer.remove_highlight("not-here", Modifiers::SHIFT).await);
        assert_eq!(viewer.store().len(), 1);
        assert_eq!(service.deletes.load(Ordering::SeqCst), 0);
        assert!(viewer.notices().is_empty());
    }

    #[tokio::test]
    async fn test_remove_requires_shift() {
        let (mut viewer, service) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;
        viewer.capture(&mut selection()).await;
        let id = viewer.overlays()[0].id.clone();

        assert!(!viewer.remove_highlight(&id, Modifiers::default()).await);
        assert_eq!(viewer.store().len(), 1);

        assert!(viewer.remove_highlight(&id, Modifiers::SHIFT).await);
        assert!(viewer.store().is_empty());
        assert_eq!(service.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_highlight() {
        let (mut viewer, _) = viewer_with(MockHighlightService {
            fail_delete: true,
            ..Default::default()
        });
        viewer.open_document("doc-1", 3).await;
        viewer.capture(&mut selection()).await;
        let id = viewer.overlays()[0].id.clone();

        assert!(!viewer.remove_highlight(&id, Modifiers::SHIFT).await);
        assert!(viewer.store().get(&id).is_some());
        assert_eq!(viewer.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_zoom_change_during_capture() {
        let (mut viewer, service) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;
        viewer.set_zoom(2.0);

        let pending = viewer.begin_capture(&mut selection()).unwrap();
        assert_eq!(viewer.state(), InteractionState::Capturing);

        viewer.set_zoom(1.0);
        viewer.next_page();

        let result = service.create(pending.request()).await;
        assert!(viewer.finish_capture(pending, result));

        let stored = viewer.store().for_page(1);
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].bounding_box,
            BoundingBox {
                x: 50.0,
                y: 100.0,
                width: 50.0,
                height: 10.0
            }
        );

        viewer.previous_page();
        viewer.set_zoom(2.0);
        assert_eq!(
            viewer.overlays()[0].rect,
            ScreenRect {
                left: 100.0,
                top: 200.0,
                width: 100.0,
                height: 20.0
            }
        );
    }

    #[tokio::test]
    async fn test_overlapping_captures() {
        let (mut viewer, service) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;

        let first = viewer.begin_capture(&mut selection()).unwrap();
        viewer.begin_selection();
        let second = viewer.begin_capture(&mut selection()).unwrap();
        assert_eq!(viewer.state(), InteractionState::Capturing);

        let result = service.create(first.request()).await;
        assert!(viewer.finish_capture(first, result));
        assert_eq!(viewer.state(), InteractionState::Capturing);

        let result = service.create(second.request()).await;
        assert!(viewer.finish_capture(second, result));
        assert_eq!(viewer.state(), InteractionState::Idle);
        assert_eq!(viewer.store().len(), 2);
    }

    #[tokio::test]
    async fn test_response_after_document_switch_is_dropped() {
        let (mut viewer, service) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;

        let pending = viewer.begin_capture(&mut selection()).unwrap();
        viewer.open_document("doc-2", 3).await;

        let result = service.create(pending.request()).await;
        assert!(!viewer.finish_capture(pending, result));
        assert!(viewer.store().is_empty());
        assert_eq!(viewer.document_id(), Some("doc-2"));
    }

    #[tokio::test]
    async fn test_empty_selection_ignored() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;

        let mut blank = FixedSelection::new(
            Rect::new(110.0, 210.0, 0.0, 0.0),
            "text",
            Rect::new(10.0, 10.0, 600.0, 800.0),
        );
        assert!(viewer.begin_capture(&mut blank).is_none());

        let mut whitespace = selection();
        whitespace.text = "   ".to_string();
        assert!(viewer.begin_capture(&mut whitespace).is_none());

        assert_eq!(viewer.state(), InteractionState::Idle);
        assert!(viewer.store().is_empty());
    }

    #[tokio::test]
    async fn test_missing_canvas_skips_silently() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;

        let mut source = selection();
        source.canvas = None;
        assert!(!viewer.capture(&mut source).await);
        assert!(viewer.notices().is_empty());
        assert!(viewer.store().is_empty());
    }

    #[tokio::test]
    async fn test_no_capture_without_document() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        assert!(viewer.begin_capture(&mut selection()).is_none());
    }

    #[tokio::test]
    async fn test_zoom_and_page_clamping() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;

        viewer.set_zoom(10.0);
        assert_eq!(viewer.zoom(), 3.0);
        viewer.zoom_in();
        assert_eq!(viewer.zoom(), 3.0);
        viewer.set_zoom(0.5);
        viewer.zoom_out();
        assert_eq!(viewer.zoom(), 0.5);
        viewer.zoom_in();
        assert_eq!(viewer.zoom(), 0.75);

        viewer.set_page(0);
        assert_eq!(viewer.current_page(), 1);
        viewer.previous_page();
        assert_eq!(viewer.current_page(), 1);
        viewer.set_page(99);
        assert_eq!(viewer.current_page(), 3);
        viewer.next_page();
        assert_eq!(viewer.current_page(), 3);
    }

    #[tokio::test]
    async fn test_failed_load_asks_for_login() {
        let (mut viewer, _) = viewer_with(MockHighlightService {
            fail_fetch: true,
            ..Default::default()
        });
        viewer.open_document("doc-1", 3).await;

        assert_eq!(viewer.document_id(), Some("doc-1"));
        assert!(viewer.store().is_empty());
        assert_eq!(viewer.notices().latest().unwrap().message, "Please log in to continue");
    }

    #[tokio::test]
    async fn test_render_error_hides_overlays() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;
        viewer.capture(&mut selection()).await;
        assert_eq!(viewer.overlays().len(), 1);

        viewer.on_load_error("corrupt xref table");
        assert!(viewer.overlays().is_empty());
        assert!(matches!(viewer.render_error(), Some(ClientError::Render(_))));

        viewer.set_zoom(1.5);
        assert_eq!(viewer.zoom(), 1.5);
    }

    #[tokio::test]
    async fn test_overlays_in_insertion_order() {
        let (mut viewer, _) = viewer_with(MockHighlightService::default());
        viewer.open_document("doc-1", 3).await;
        viewer.capture(&mut selection()).await;
        viewer.capture(&mut selection()).await;

        let ids: Vec<String> = viewer.overlays().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["h0".to_string(), "h1".to_string()]);
    }

    #[tokio::test]
    async fn test_reopen_reloads_saved_highlights() {
        let service = Arc::new(MockHighlightService::default());
        service.saved.lock().unwrap().push(highlight("saved", "doc-1", 2));

        let mut viewer = DocumentViewer::new(service.clone(), ViewerConfig::default());
        viewer.open_document("doc-1", 3).await;
        assert!(viewer.overlays().is_empty());

        viewer.set_page(2);
        assert_eq!(viewer.overlays().len(), 1);

        viewer.close_document();
        assert!(viewer.store().is_empty());
        assert!(viewer.overlays().is_empty());
    }
}
