use serde::{Deserialize, Serialize};

/// Media classification of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    /// PDFs and any other non-image, non-video content.
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// One uploaded file attached to a post. Stored embedded in the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Publicly fetchable delivery URL, already normalized for `kind`.
    pub url: String,
    pub kind: MediaKind,
    /// Handle for remote deletion, absent when the store did not assign one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}
