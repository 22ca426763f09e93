//! Coordinate model
//!
//! Selections arrive in absolute screen pixels. Highlights are persisted in
//! unscaled document space: zoom 1.0 with the origin at the top-left of the
//! rendered page canvas. Rendering projects them back by the current zoom.

use serde::{Deserialize, Serialize};

/// Smallest zoom factor the viewer renders at
pub const MIN_SCALE: f64 = 0.5;
/// Largest zoom factor the viewer renders at
pub const MAX_SCALE: f64 = 3.0;

/// Axis-aligned rectangle in screen pixels, as reported by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// No area to highlight
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Highlight rectangle in unscaled document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Overlay position relative to the page canvas at the current zoom
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Normalize a selection against the canvas it was made on.
///
/// Returns `None` when `scale` is not a positive finite number.
pub fn to_document_space(selection: &Rect, canvas: &Rect, scale: f64) -> Option<BoundingBox> {
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    Some(BoundingBox {
        x: (selection.left - canvas.left) / scale,
        y: (selection.top - canvas.top) / scale,
        width: selection.width / scale,
        height: selection.height / scale,
    })
}

/// Project a stored box onto the canvas at `scale`
pub fn to_screen_space(bbox: &BoundingBox, scale: f64) -> ScreenRect {
    ScreenRect {
        left: bbox.x * scale,
        top: bbox.y * scale,
        width: bbox.width * scale,
        height: bbox.height * scale,
    }
}

/// Clamp a zoom factor into `[MIN_SCALE, MAX_SCALE]`; NaN resets to 1.0
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
