//! PDF Annotator viewer core
//!
//! Everything the viewer needs apart from pixels: the coordinate model that
//! keeps highlights zoom-independent, the per-document highlight store, HTTP
//! clients for the annotator server, and the interaction state machine that
//! ties selection, persistence, and rendering together.

pub mod client;
pub mod error;
pub mod geometry;
pub mod model;
pub mod notice;
pub mod selection;
pub mod store;
pub mod viewer;

pub use client::{AuthClient, DocumentClient, HighlightClient, HighlightService, Session};
pub use error::{ClientError, Result};
pub use geometry::{BoundingBox, Rect, ScreenRect};
pub use model::{Document, Highlight, HighlightPatch, NewHighlight, UploadedDocument};
pub use notice::{Notice, NoticeLevel, Notices};
pub use selection::{FixedSelection, SelectionSource};
pub use store::HighlightStore;
pub use viewer::{DocumentViewer, InteractionState, Modifiers, Overlay, PendingCapture, ViewerConfig};
