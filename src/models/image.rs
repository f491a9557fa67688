use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Reference to an image held by the external image host.
/// Immutable once created; owned by exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub external_id: String,
    pub url: String,
}

/// Binary payload extracted from a multipart upload field
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub data: Bytes,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}
