//! Storage types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about a storage object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// A storage object with its data
#[derive(Debug)]
pub struct StorageObject {
    pub metadata: ObjectMetadata,
    pub data: Vec<u8>,
}

/// Build the object key for an uploaded PDF: `<uuid><ext>`
///
/// The extension is taken from the client-supplied file name, dot included,
/// so `report.final.PDF` becomes `<uuid>.PDF`.
pub fn object_key(uuid: &str, original_name: &str) -> String {
    let ext = std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    format!("{}{}", uuid, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        assert_eq!(object_key("abc", "paper.pdf"), "abc.pdf");
        assert_eq!(object_key("abc", "report.final.PDF"), "abc.PDF");
    }

    #[test]
    fn test_object_key_without_extension() {
        assert_eq!(object_key("abc", "README"), "abc");
    }
}
