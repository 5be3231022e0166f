use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::community::parse_post_id,
    models::{
        comment::{CommentResponse, CreateCommentRequest},
        post::LikesResponse,
        user::Identity,
    },
    services::feed::FeedService,
};

/// Like a post. Liking twice is rejected with 403.
pub async fn like_post(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let likes = feeds.like(parse_post_id(&post_id)?, &identity).await?;

    Ok(Json(LikesResponse { likes }))
}

/// Unlike a post. Unliking a post you never liked is a no-op.
pub async fn unlike_post(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let likes = feeds.unlike(parse_post_id(&post_id)?, &identity).await?;

    Ok(Json(LikesResponse { likes }))
}

/// Append a comment; responds with the post's full comment list.
pub async fn create_comment(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let comments = feeds
        .add_comment(parse_post_id(&post_id)?, &identity, &payload.text)
        .await?;

    Ok(Json(
        comments
            .into_iter()
            .map(CommentResponse::from)
            .collect::<Vec<_>>(),
    ))
}
