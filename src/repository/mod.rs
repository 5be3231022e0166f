// src/repository/mod.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{comment::Comment, post::Post},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryFeedRepository;
pub use postgres::PgFeedRepository;

/// Result of an add-if-absent like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Added(i64),
    AlreadyPresent(i64),
    PostMissing,
}

/// Persistence for posts.
///
/// Likes and comments only change through the single-statement operations
/// below. There is no whole-document replace.
#[async_trait]
pub trait FeedRepository: Send + Sync {
    async fn insert(&self, post: &Post) -> Result<Post, AppError>;

    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, AppError>;

    /// Posts created by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Post>, AppError>;

    async fn add_like(&self, id: Uuid, user_id: &str) -> Result<LikeOutcome, AppError>;

    /// Removes `user_id` if present. `None` when the post does not exist.
    async fn remove_like(&self, id: Uuid, user_id: &str) -> Result<Option<i64>, AppError>;

    /// Appends a comment. `None` when the post does not exist.
    async fn push_comment(&self, id: Uuid, comment: &Comment)
    -> Result<Option<Vec<Comment>>, AppError>;

    /// Returns whether a post was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}
