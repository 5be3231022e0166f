use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::AuthorView;

/// A comment embedded in a post. Append-only: never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author_id: String,
    /// Display name snapshotted from the verified identity at write time.
    pub author_username: String,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    #[serde(default)]
    pub text: String,
}

/// DTO for displaying a comment with author info.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub commented_by: AuthorView,
    pub text: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            commented_by: AuthorView {
                id: comment.author_id,
                username: comment.author_username,
            },
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}
