use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    attachment::Attachment,
    comment::{Comment, CommentResponse},
    user::AuthorView,
};

/// A feed post, as persisted by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    pub owner_username: String,

    /// Insertion order is display order.
    pub attachments: Vec<Attachment>,

    /// Identity ids; each appears at most once.
    pub likes: Vec<String>,

    pub comments: Vec<Comment>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Post {
    pub fn is_owned_by(&self, identity_id: &str) -> bool {
        self.owner_id == identity_id
    }
}

/// DTO for creating a new post. Built from the text parts of the multipart body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title is required and must be at most 200 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 10000,
        message = "Description is required and must be at most 10000 chars"
    ))]
    pub description: String,
}

/// Display projection of a post returned to clients.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub posted_by: AuthorView,
    pub attachments: Vec<Attachment>,
    pub likes: Vec<String>,
    pub likes_count: usize,
    pub comments: Vec<CommentResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            description: post.description,
            posted_by: AuthorView {
                id: post.owner_id,
                username: post.owner_username,
            },
            attachments: post.attachments,
            likes_count: post.likes.len(),
            likes: post.likes,
            comments: post.comments.into_iter().map(CommentResponse::from).collect(),
            created_at: post.created_at,
        }
    }
}

/// Response for like/unlike.
#[derive(Debug, Serialize, Deserialize)]
pub struct LikesResponse {
    pub likes: i64,
}

/// Result of one best-effort remote delete during post deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupStatus {
    Removed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub storage_key: String,
    pub status: CleanupStatus,
}

/// Returned by a successful owner delete.
#[derive(Debug, Serialize)]
pub struct DeletionReport {
    pub message: String,
    pub id: Uuid,
    pub cleanup: Vec<CleanupOutcome>,
}
