// src/storage/mod.rs

use async_trait::async_trait;
use thiserror::Error;

use crate::models::attachment::MediaKind;

pub mod cloudinary;
pub mod memory;

pub use cloudinary::CloudinaryStore;
pub use memory::InMemoryObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store request failed: {0}")]
    Transport(String),

    #[error("object store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("object store returned an unexpected response: {0}")]
    InvalidResponse(String),
}

/// A file received from the client, ready to be uploaded.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the object store reports back for one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub storage_key: Option<String>,
    /// Resource kind as classified by the provider, when it reports one.
    pub resource_kind: Option<MediaKind>,
}

/// Remote object storage for post attachments.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject, StorageError>;

    async fn delete(&self, storage_key: &str, kind: MediaKind) -> Result<(), StorageError>;
}
