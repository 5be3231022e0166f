// src/services/media.rs

use url::Url;

use crate::{
    models::attachment::{Attachment, MediaKind},
    storage::StoredObject,
};

/// Delivery-path segment used for image transformations.
pub const IMAGE_DELIVERY_SEGMENT: &str = "/image/upload/";

/// Delivery-path segment that serves bytes untouched.
pub const RAW_DELIVERY_SEGMENT: &str = "/raw/upload/";

/// Classifies a declared MIME type. Parameters (`; charset=...`) and case are ignored.
pub fn classify(content_type: &str) -> MediaKind {
    let essence = mime_essence(content_type);

    if essence.starts_with("image/") {
        MediaKind::Image
    } else if essence.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Document
    }
}

/// MIME types that say nothing about the content.
const GENERIC_CONTENT_TYPES: [&str; 3] = ["", "application/octet-stream", "binary/octet-stream"];

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Picks the final kind for an upload.
///
/// A provider-reported `video` or `document` wins over the declared MIME type.
/// A reported `image` holds unless the MIME type names a non-image family
/// (a PDF is still a document when auto upload rasterized it).
pub fn resolve_kind(content_type: &str, reported: Option<MediaKind>) -> MediaKind {
    match reported {
        Some(kind @ (MediaKind::Video | MediaKind::Document)) => kind,
        Some(MediaKind::Image) => {
            if GENERIC_CONTENT_TYPES.contains(&mime_essence(content_type).as_str()) {
                MediaKind::Image
            } else {
                classify(content_type)
            }
        }
        None => classify(content_type),
    }
}

/// Rewrites an image delivery URL to the raw delivery path for documents.
/// Other kinds, and URLs without the image segment, come back unchanged.
pub fn normalize_url(url: &str, kind: MediaKind) -> String {
    if kind != MediaKind::Document {
        return url.to_string();
    }

    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.path().contains(IMAGE_DELIVERY_SEGMENT) {
                let path = parsed
                    .path()
                    .replacen(IMAGE_DELIVERY_SEGMENT, RAW_DELIVERY_SEGMENT, 1);
                parsed.set_path(&path);
            }
            parsed.to_string()
        }
        Err(_) => url.replacen(IMAGE_DELIVERY_SEGMENT, RAW_DELIVERY_SEGMENT, 1),
    }
}

/// Turns an object-store result into a persisted attachment.
pub fn build_attachment(content_type: &str, stored: StoredObject) -> Attachment {
    let kind = resolve_kind(content_type, stored.resource_kind);
    Attachment {
        url: normalize_url(&stored.url, kind),
        kind,
        storage_key: stored.storage_key,
    }
}
