// src/repository/postgres.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{attachment::Attachment, comment::Comment, post::Post},
    repository::{FeedRepository, LikeOutcome},
};

/// Postgres-backed post repository.
#[derive(Clone)]
pub struct PgFeedRepository {
    pool: PgPool,
}

impl PgFeedRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of the 'posts' table.
#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    description: String,
    owner_id: String,
    owner_username: String,
    attachments: Json<Vec<Attachment>>,
    likes: Vec<String>,
    comments: Json<Vec<Comment>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            owner_id: row.owner_id,
            owner_username: row.owner_username,
            attachments: row.attachments.0,
            likes: row.likes,
            comments: row.comments.0,
            created_at: row.created_at,
        }
    }
}

const INSERT_POST: &str = r#"
    INSERT INTO posts (id, title, description, owner_id, owner_username,
                       attachments, likes, comments, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    RETURNING id, title, description, owner_id, owner_username,
              attachments, likes, comments, created_at
"#;

const LIST_POSTS: &str = r#"
    SELECT id, title, description, owner_id, owner_username,
           attachments, likes, comments, created_at
    FROM posts
    ORDER BY created_at DESC
"#;

const LIST_POSTS_BY_OWNER: &str = r#"
    SELECT id, title, description, owner_id, owner_username,
           attachments, likes, comments, created_at
    FROM posts
    WHERE owner_id = $1
    ORDER BY created_at DESC
"#;

const FIND_POST: &str = r#"
    SELECT id, title, description, owner_id, owner_username,
           attachments, likes, comments, created_at
    FROM posts
    WHERE id = $1
"#;

#[async_trait]
impl FeedRepository for PgFeedRepository {
    async fn insert(&self, post: &Post) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(INSERT_POST)
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.owner_id)
        .bind(&post.owner_username)
        .bind(Json(&post.attachments))
        .bind(&post.likes)
        .bind(Json(&post.comments))
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert post: {:?}", e);
            AppError::from(e)
        })?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(LIST_POSTS)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(LIST_POSTS_BY_OWNER)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, AppError> {
        let row = sqlx::query_as::<_, PostRow>(FIND_POST)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    async fn add_like(&self, id: Uuid, user_id: &str) -> Result<LikeOutcome, AppError> {
        // Conditional push: concurrent likes by the same user serialize on the
        // row lock and the loser re-checks the predicate.
        let added: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET likes = array_append(likes, $2)
            WHERE id = $1 AND NOT ($2 = ANY(likes))
            RETURNING cardinality(likes)::BIGINT
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(count) = added {
            return Ok(LikeOutcome::Added(count));
        }

        // Nothing updated: either already liked or no such post.
        let current: Option<i64> =
            sqlx::query_scalar("SELECT cardinality(likes)::BIGINT FROM posts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match current {
            Some(count) => LikeOutcome::AlreadyPresent(count),
            None => LikeOutcome::PostMissing,
        })
    }

    async fn remove_like(&self, id: Uuid, user_id: &str) -> Result<Option<i64>, AppError> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET likes = array_remove(likes, $2)
            WHERE id = $1
            RETURNING cardinality(likes)::BIGINT
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(count)
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: &Comment,
    ) -> Result<Option<Vec<Comment>>, AppError> {
        let comments: Option<Json<Vec<Comment>>> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET comments = comments || $2
            WHERE id = $1
            RETURNING comments
            "#,
        )
        .bind(id)
        .bind(Json(std::slice::from_ref(comment)))
        .fetch_optional(&self.pool)
        .await?;

        Ok(comments.map(|Json(comments)| comments))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
