// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{community, interaction, profile},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public reads: feed list and single post.
/// * Authenticated mutations: create, delete, like, unlike, comment, profile.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let public_feed_routes = Router::new()
        .route("/", get(community::list_posts))
        .route("/{id}", get(community::get_post));

    let protected_feed_routes = Router::new()
        .route(
            "/",
            post(community::create_post)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/{id}", delete(community::delete_post))
        .route("/{id}/like", post(interaction::like_post))
        .route("/{id}/unlike", post(interaction::unlike_post))
        .route("/{id}/comment", post(interaction::create_comment))
        .route_layer(auth.clone());

    let profile_routes = Router::new()
        .route("/", get(profile::get_me))
        .route_layer(auth);

    Router::new()
        .nest("/api/feeds", public_feed_routes.merge(protected_feed_routes))
        .nest("/api/profile", profile_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
