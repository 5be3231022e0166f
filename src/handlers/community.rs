use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        post::{CreatePostRequest, PostResponse},
        user::Identity,
    },
    services::feed::FeedService,
    storage::UploadFile,
};

/// Multipart field shared by all attached files.
pub const FILES_FIELD: &str = "files";
/// Older clients send a single file under this name.
const LEGACY_FILE_FIELD: &str = "image";

/// Unknown and malformed ids are both reported as a missing post.
pub fn parse_post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Post not found".to_string()))
}

/// Create a new post from a multipart form: `title`, `description` and up to
/// the configured number of `files`.
/// Requires: Login.
pub async fn create_post(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut request = CreatePostRequest::default();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => request.title = field.text().await?,
            "description" => request.description = field.text().await?,
            FILES_FIELD | LEGACY_FILE_FIELD => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "upload".to_string());
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let bytes = field.bytes().await?;

                // Browsers submit an empty part for an untouched file input.
                if bytes.is_empty() {
                    continue;
                }

                if files.len() >= feeds.max_attachments() {
                    return Err(AppError::BadRequest(format!(
                        "At most {} files can be attached to a post",
                        feeds.max_attachments()
                    )));
                }

                files.push(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let post = feeds.create_post(&identity, request, files).await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// List all posts, newest first.
pub async fn list_posts(State(feeds): State<FeedService>) -> Result<impl IntoResponse, AppError> {
    let posts = feeds.list_posts().await?;

    Ok(Json(
        posts.into_iter().map(PostResponse::from).collect::<Vec<_>>(),
    ))
}

/// Get a single post by ID.
pub async fn get_post(
    State(feeds): State<FeedService>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = feeds.get_post(parse_post_id(&id)?).await?;

    Ok(Json(PostResponse::from(post)))
}

/// Delete a post and its remote files.
/// Requires: Login + Author.
pub async fn delete_post(
    State(feeds): State<FeedService>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = feeds.delete_post(parse_post_id(&id)?, &identity).await?;

    Ok(Json(report))
}
