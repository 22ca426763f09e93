//! Text selection capability
//!
//! The viewer never talks to a DOM or window system directly. Hosts expose
//! the current selection and the page canvas position through
//! [`SelectionSource`].

use crate::geometry::Rect;

pub trait SelectionSource {
    /// Bounding rectangle of the active selection, in screen pixels
    fn active_selection_rect(&self) -> Option<Rect>;

    fn selected_text(&self) -> String;

    /// Position of the rendered page canvas; `None` when nothing is rendered
    fn canvas_rect(&self) -> Option<Rect>;

    fn clear_selection(&mut self);
}

/// Selection with fixed geometry, for headless hosts and tests
#[derive(Debug, Clone, Default)]
pub struct FixedSelection {
    pub rect: Option<Rect>,
    pub text: String,
    pub canvas: Option<Rect>,
}

impl FixedSelection {
    pub fn new(rect: Rect, text: impl Into<String>, canvas: Rect) -> Self {
        Self {
            rect: Some(rect),
            text: text.into(),
            canvas: Some(canvas),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.rect.is_none() && self.text.is_empty()
    }
}

impl SelectionSource for FixedSelection {
    fn active_selection_rect(&self) -> Option<Rect> {
        self.rect
    }

    fn selected_text(&self) -> String {
        self.text.clone()
    }

    fn canvas_rect(&self) -> Option<Rect> {
        self.canvas
    }

    fn clear_selection(&mut self) {
        self.rect = None;
        self.text.clear();
    }
}
