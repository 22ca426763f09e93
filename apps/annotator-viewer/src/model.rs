//! Wire types shared with the annotator server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A persisted highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    /// Owning user; filled in by the server
    #[serde(default)]
    pub user: String,
    /// Document UUID
    #[serde(rename = "pdf")]
    pub document_id: String,
    /// 1-indexed page number
    pub page: u32,
    pub text: String,
    pub bounding_box: BoundingBox,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Create request; the server assigns `id` and owner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighlight {
    #[serde(rename = "pdf")]
    pub document_id: String,
    pub page: u32,
    pub text: String,
    pub bounding_box: BoundingBox,
    #[serde(rename = "timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// Uploaded PDF as listed by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub uuid: String,
    /// Object storage key
    pub filename: String,
    pub originalname: String,
    pub upload_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedDocument {
    pub uuid: String,
    pub filename: String,
    pub originalname: String,
}
