// src/storage/cloudinary.rs

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use crate::{
    config::CloudinaryConfig,
    models::attachment::MediaKind,
    storage::{ObjectStore, StorageError, StoredObject, UploadFile},
};

/// Cloudinary upload API client.
///
/// Uploads go through the `auto` endpoint, so the provider decides the
/// resource type and usually hands back an image-shaped delivery URL even for
/// documents. URL correction happens later in `services::media`.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: Option<String>,
    resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    async fn destroy(&self, storage_key: &str, resource_type: &str) -> Result<String, StorageError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", storage_key), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&[
                ("public_id", storage_key),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let body: DestroyResponse = read_json(response).await?;
        Ok(body.result)
    }
}

#[async_trait]
impl ObjectStore for CloudinaryStore {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject, StorageError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let body: UploadResponse = read_json(response).await?;

        tracing::debug!(
            public_id = ?body.public_id,
            resource_type = ?body.resource_type,
            "Uploaded {} to Cloudinary",
            file.file_name
        );

        Ok(StoredObject {
            url: body.secure_url,
            storage_key: body.public_id,
            resource_kind: body.resource_type.as_deref().and_then(resource_kind),
        })
    }

    async fn delete(&self, storage_key: &str, kind: MediaKind) -> Result<(), StorageError> {
        let mut result = self.destroy(storage_key, resource_type(kind)).await?;

        // `auto` uploads store PDFs as image resources.
        if result == "not found" && kind == MediaKind::Document {
            result = self.destroy(storage_key, "image").await?;
        }

        match result.as_str() {
            "ok" => Ok(()),
            other => Err(StorageError::InvalidResponse(format!(
                "destroy {} returned '{}'",
                storage_key, other
            ))),
        }
    }
}

/// Cloudinary request signature: SHA-1 over the `&`-joined, key-sorted
/// parameters with the API secret appended.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn resource_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "image",
        MediaKind::Video => "video",
        MediaKind::Document => "raw",
    }
}

fn resource_kind(resource_type: &str) -> Option<MediaKind> {
    match resource_type {
        "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "raw" => Some(MediaKind::Document),
        _ => None,
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, StorageError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| StorageError::Transport(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or(text);
        return Err(StorageError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&text).map_err(|e| StorageError::InvalidResponse(e.to_string()))
}
