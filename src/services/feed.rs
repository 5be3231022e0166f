// src/services/feed.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        attachment::Attachment,
        comment::{Comment, CreateCommentRequest},
        post::{CleanupOutcome, CleanupStatus, CreatePostRequest, DeletionReport, Post},
        user::Identity,
    },
    repository::{FeedRepository, LikeOutcome},
    services::media::build_attachment,
    storage::{ObjectStore, UploadFile},
    utils::html::strip_tags,
};

/// The feed engine: post creation, likes, comments and owner-gated deletion.
///
/// Stateless between requests; all state lives behind the repository.
#[derive(Clone)]
pub struct FeedService {
    repo: Arc<dyn FeedRepository>,
    store: Arc<dyn ObjectStore>,
    max_attachments: usize,
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

/// Strips markup; text that was nothing but markup counts as missing.
fn non_empty_text(raw: &str, field: &str) -> Result<String, AppError> {
    let text = strip_tags(raw);
    if text.is_empty() {
        return Err(AppError::BadRequest(format!("{}: must not be empty", field)));
    }
    Ok(text)
}

impl FeedService {
    pub fn new(
        repo: Arc<dyn FeedRepository>,
        store: Arc<dyn ObjectStore>,
        max_attachments: usize,
    ) -> Self {
        Self {
            repo,
            store,
            max_attachments,
        }
    }

    pub fn max_attachments(&self) -> usize {
        self.max_attachments
    }

    /// Creates a post owned by `owner`.
    ///
    /// Files are uploaded in input order. Any failed upload aborts the whole
    /// creation and nothing is persisted; objects already uploaded by this
    /// request stay behind in the store.
    pub async fn create_post(
        &self,
        owner: &Identity,
        request: CreatePostRequest,
        files: Vec<UploadFile>,
    ) -> Result<Post, AppError> {
        // Limits apply to what the user typed, before markup is stripped.
        let request = CreatePostRequest {
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
        };
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let title = non_empty_text(&request.title, "title")?;
        let description = non_empty_text(&request.description, "description")?;

        if files.len() > self.max_attachments {
            return Err(AppError::BadRequest(format!(
                "At most {} files can be attached to a post",
                self.max_attachments
            )));
        }

        let mut attachments: Vec<Attachment> = Vec::with_capacity(files.len());
        for file in &files {
            let stored = match self.store.upload(file).await {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!(
                        owner = %owner.id,
                        orphaned = attachments.len(),
                        "Upload of {} failed, aborting post creation",
                        file.file_name
                    );
                    return Err(e.into());
                }
            };
            attachments.push(build_attachment(&file.content_type, stored));
        }

        let post = Post {
            id: Uuid::new_v4(),
            title,
            description,
            owner_id: owner.id.clone(),
            owner_username: owner.username.clone(),
            attachments,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: chrono::Utc::now(),
        };

        let post = self.repo.insert(&post).await?;
        tracing::info!(
            post_id = %post.id,
            owner = %owner.id,
            attachments = post.attachments.len(),
            "Post created"
        );
        Ok(post)
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        self.repo.list().await
    }

    pub async fn list_posts_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, AppError> {
        self.repo.list_by_owner(owner_id).await
    }

    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, AppError> {
        self.repo.find(post_id).await?.ok_or_else(post_not_found)
    }

    /// Adds the caller to the post's likes. Returns the new like count.
    pub async fn like(&self, post_id: Uuid, caller: &Identity) -> Result<i64, AppError> {
        match self.repo.add_like(post_id, &caller.id).await? {
            LikeOutcome::Added(count) => Ok(count),
            LikeOutcome::AlreadyPresent(_) => Err(AppError::AlreadyLiked),
            LikeOutcome::PostMissing => Err(post_not_found()),
        }
    }

    /// Removes the caller from the post's likes; a no-op if absent.
    pub async fn unlike(&self, post_id: Uuid, caller: &Identity) -> Result<i64, AppError> {
        self.repo
            .remove_like(post_id, &caller.id)
            .await?
            .ok_or_else(post_not_found)
    }

    /// Appends a comment and returns the post's full comment sequence.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        caller: &Identity,
        text: &str,
    ) -> Result<Vec<Comment>, AppError> {
        let request = CreateCommentRequest {
            text: text.trim().to_string(),
        };
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let text = non_empty_text(&request.text, "text")?;

        let comment = Comment {
            author_id: caller.id.clone(),
            author_username: caller.username.clone(),
            text,
            created_at: chrono::Utc::now(),
        };

        self.repo
            .push_comment(post_id, &comment)
            .await?
            .ok_or_else(post_not_found)
    }

    /// Deletes a post owned by the caller.
    ///
    /// Remote objects are removed first, best-effort: a failed remote delete
    /// is logged and reported but never blocks removal of the record.
    pub async fn delete_post(
        &self,
        post_id: Uuid,
        caller: &Identity,
    ) -> Result<DeletionReport, AppError> {
        let post = self.get_post(post_id).await?;

        if !post.is_owned_by(&caller.id) {
            return Err(AppError::Forbidden(
                "You are not authorized to delete this post".to_string(),
            ));
        }

        let mut cleanup = Vec::new();
        for attachment in &post.attachments {
            let Some(storage_key) = attachment.storage_key.as_deref() else {
                continue;
            };

            let status = match self.store.delete(storage_key, attachment.kind).await {
                Ok(()) => {
                    tracing::info!(post_id = %post_id, storage_key, "Removed remote object");
                    CleanupStatus::Removed
                }
                Err(e) => {
                    tracing::warn!(
                        post_id = %post_id,
                        storage_key,
                        "Failed to remove remote object: {}",
                        e
                    );
                    CleanupStatus::Failed
                }
            };
            cleanup.push(CleanupOutcome {
                storage_key: storage_key.to_string(),
                status,
            });
        }

        if !self.repo.delete(post_id).await? {
            // Removed concurrently by another request.
            return Err(post_not_found());
        }

        tracing::info!(post_id = %post_id, owner = %caller.id, "Post deleted");

        Ok(DeletionReport {
            message: "Feed deleted successfully".to_string(),
            id: post_id,
            cleanup,
        })
    }
}
