use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    models::{
        post::PostResponse,
        user::{AuthorView, Identity, ProfileResponse},
    },
    services::feed::FeedService,
};

/// Get the current user's identity and their own posts, newest first.
pub async fn get_me(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let posts = feeds.list_posts_by_owner(&identity.id).await?;

    Ok(Json(ProfileResponse {
        user: AuthorView::from(&identity),
        feeds: posts.into_iter().map(PostResponse::from).collect(),
    }))
}
