// src/repository/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{comment::Comment, post::Post},
    repository::{FeedRepository, LikeOutcome},
};

/// In-process repository. Each operation runs under one lock acquisition,
/// which gives it the same atomicity as the single-statement SQL updates.
#[derive(Debug, Default)]
pub struct InMemoryFeedRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryFeedRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    posts
}

#[async_trait]
impl FeedRepository for InMemoryFeedRepository {
    async fn insert(&self, post: &Post) -> Result<Post, AppError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(AppError::InternalServerError(format!(
                "duplicate post id {}",
                post.id
            )));
        }
        posts.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let posts = self.posts.read().await;
        Ok(newest_first(posts.values().cloned().collect()))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, AppError> {
        let posts = self.posts.read().await;
        Ok(newest_first(
            posts
                .values()
                .filter(|post| post.owner_id == owner_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn add_like(&self, id: Uuid, user_id: &str) -> Result<LikeOutcome, AppError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.get_mut(&id) else {
            return Ok(LikeOutcome::PostMissing);
        };

        if post.likes.iter().any(|liker| liker == user_id) {
            return Ok(LikeOutcome::AlreadyPresent(post.likes.len() as i64));
        }
        post.likes.push(user_id.to_string());
        Ok(LikeOutcome::Added(post.likes.len() as i64))
    }

    async fn remove_like(&self, id: Uuid, user_id: &str) -> Result<Option<i64>, AppError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.likes.retain(|liker| liker != user_id);
            post.likes.len() as i64
        }))
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Vec<Comment>>, AppError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.comments.push(comment.clone());
            post.comments.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
